//! 绝热火焰温度工具

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::chem;
use crate::tools::ToolResult;

pub const NAME: &str = "calculate_adiabatic_flame_temperature";
pub const DESCRIPTION: &str = "Calculates the adiabatic flame temperature (AFT) for a fuel/oxidizer \
mixture. Oxidizer is 'air' or 'O2'; equivalence_ratio phi < 1 lean, = 1 stoichiometric, > 1 rich.";

/// 参数：燃料、氧化剂、当量比、初始温度 K、初始压力 Pa（后两者缺省为标准状态）
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlameTemperatureArgs {
    /// 燃料化学式，如 'CH4'、'C2H5OH'
    pub fuel: String,
    /// 'O2' 或 'air'
    pub oxidizer: String,
    pub equivalence_ratio: f64,
    #[serde(default = "default_initial_temp_k")]
    pub initial_temp_k: f64,
    #[serde(default = "default_initial_pressure_pa")]
    pub initial_pressure_pa: f64,
}

fn default_initial_temp_k() -> f64 {
    298.15
}

fn default_initial_pressure_pa() -> f64 {
    101_325.0
}

fn echo_args(args: &FlameTemperatureArgs) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("fuel".into(), json!(args.fuel));
    m.insert("oxidizer".into(), json!(args.oxidizer));
    m.insert("equivalence_ratio".into(), json!(args.equivalence_ratio));
    m.insert("initial_temperature_K".into(), json!(args.initial_temp_k));
    m.insert("initial_pressure_Pa".into(), json!(args.initial_pressure_pa));
    m
}

pub fn run(args: &FlameTemperatureArgs) -> ToolResult {
    match chem::adiabatic_flame_temperature(
        &args.fuel,
        &args.oxidizer,
        args.equivalence_ratio,
        args.initial_temp_k,
        args.initial_pressure_pa,
    ) {
        Ok(aft_k) => {
            let mut payload = echo_args(args);
            payload.insert("adiabatic_flame_temperature_K".into(), json!(aft_k));
            payload.insert(
                "adiabatic_flame_temperature_C".into(),
                json!(aft_k - 273.15),
            );
            ToolResult::success(payload)
        }
        Err(e) => ToolResult::error_with(
            format!("Flame temperature calculation failed: {}", e),
            echo_args(args),
        ),
    }
}
