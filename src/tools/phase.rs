//! 相图数据生成工具
//!
//! 单相理想快照：校验组分与摩尔分数后归一化，汽 / 液两侧返回同一组成
//! （与原数值协作方的简化行为一致）。

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::chem;
use crate::tools::ToolResult;

pub const NAME: &str = "generate_phase_diagram";
pub const DESCRIPTION: &str = "Generates phase composition data (vapor/liquid) for a component \
mixture at a given temperature and pressure.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PhaseDiagramArgs {
    /// 组分列表，如 ["CH4", "O2", "N2"]
    pub components: Vec<String>,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    /// 与 components 一一对应的摩尔分数
    pub mole_fractions: Vec<f64>,
}

fn echo_args(args: &PhaseDiagramArgs) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("components".into(), json!(args.components));
    m.insert("temperature_K".into(), json!(args.temperature_k));
    m.insert("pressure_Pa".into(), json!(args.pressure_pa));
    m
}

pub fn run(args: &PhaseDiagramArgs) -> ToolResult {
    if args.components.is_empty() || args.components.len() != args.mole_fractions.len() {
        return ToolResult::error_with(
            format!(
                "Phase diagram generation failed: {} components but {} mole fractions",
                args.components.len(),
                args.mole_fractions.len()
            ),
            echo_args(args),
        );
    }
    if !(args.temperature_k.is_finite() && args.temperature_k > 0.0)
        || !(args.pressure_pa.is_finite() && args.pressure_pa > 0.0)
    {
        return ToolResult::error_with(
            "Phase diagram generation failed: temperature and pressure must be positive",
            echo_args(args),
        );
    }

    let mut total = 0.0;
    for (component, fraction) in args.components.iter().zip(&args.mole_fractions) {
        if let Err(e) = chem::parse_formula(component) {
            return ToolResult::error_with(
                format!("Phase diagram generation failed: {}", e),
                echo_args(args),
            );
        }
        if !(fraction.is_finite() && *fraction > 0.0) {
            return ToolResult::error_with(
                format!(
                    "Phase diagram generation failed: mole fraction for '{}' must be positive",
                    component
                ),
                echo_args(args),
            );
        }
        total += fraction;
    }

    let composition: BTreeMap<String, f64> = args
        .components
        .iter()
        .zip(&args.mole_fractions)
        .map(|(c, x)| (c.clone(), x / total))
        .collect();

    let mut payload = echo_args(args);
    payload.insert(
        "phase_data".into(),
        json!({
            "vapor_composition": composition,
            "liquid_composition": composition,
        }),
    );
    ToolResult::success(payload)
}
