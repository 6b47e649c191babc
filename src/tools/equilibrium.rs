//! 平衡组成求解工具

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::chem;
use crate::tools::ToolResult;

pub const NAME: &str = "get_equilibrium_concentrations";
pub const DESCRIPTION: &str = "Calculates equilibrium mole fractions of a mixture at a given \
temperature and pressure. Mixture format: 'CH4:1, O2:2, N2:7.52'.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EquilibriumArgs {
    /// 初始混合物配比串，如 'CH4:1, O2:2, N2:7.52'
    pub mixture_formula: String,
    pub temperature_k: f64,
    pub pressure_pa: f64,
}

fn echo_args(args: &EquilibriumArgs) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("mixture_formula".into(), json!(args.mixture_formula));
    m.insert("temperature_K".into(), json!(args.temperature_k));
    m.insert("pressure_Pa".into(), json!(args.pressure_pa));
    m
}

pub fn run(args: &EquilibriumArgs) -> ToolResult {
    match chem::equilibrium_composition(&args.mixture_formula, args.temperature_k, args.pressure_pa)
    {
        Ok(fractions) => {
            let mut payload = echo_args(args);
            payload.insert(
                "equilibrium_mole_fractions".into(),
                json!(fractions),
            );
            ToolResult::success(payload)
        }
        Err(e) => ToolResult::error_with(
            format!(
                "Equilibrium calculation failed for mixture '{}' at {}K, {}Pa: {}",
                args.mixture_formula, args.temperature_k, args.pressure_pa, e
            ),
            echo_args(args),
        ),
    }
}
