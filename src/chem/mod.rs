//! 化学计算支撑库
//!
//! 工具层的数值协作方：化学式解析、摩尔质量、理想气体热力学估算与完全燃烧平衡。
//! 数值为工程估算而非精确模拟（精确结果不在保证范围内），但摩尔质量为精确查表值。

pub mod formula;
pub mod periodic;
pub mod thermo;

use thiserror::Error;

pub use formula::{molecular_weight, parse_formula, parse_mixture};
pub use thermo::{
    adiabatic_flame_temperature, equilibrium_composition, species_thermo, ThermoProperties,
};

/// 化学计算错误：未知物种 / 化学式或混合物格式错误 / 非法输入
#[derive(Error, Debug)]
pub enum ChemError {
    #[error("Species '{0}' not found")]
    UnknownSpecies(String),

    #[error("Bad formula '{0}'")]
    BadFormula(String),

    #[error("Bad mixture specification '{0}': expected e.g. 'CH4:1, O2:2, N2:7.52'")]
    BadMixture(String),

    #[error("Unsupported oxidizer '{0}': use 'air' or 'O2'")]
    UnsupportedOxidizer(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
