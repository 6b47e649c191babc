//! 过程模拟快照工具
//!
//! 稳态快照估算：出口组成取完全转化近似的平衡组成，转化率按首个进料物种的
//! 摩尔分数变化计算。reactor_params 可选（如 volume），仅校验并回显。

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::chem;
use crate::tools::ToolResult;

pub const NAME: &str = "process_simulation_snapshot";
pub const DESCRIPTION: &str = "Simulates a steady-state process snapshot (outlet composition and \
conversion) for a given inlet composition, temperature, pressure and flow rate.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProcessSimulationArgs {
    /// 过程类型，如 'combustion'、'reaction'
    pub process_type: String,
    /// 进口组成配比串，如 'CH4:1, O2:2, N2:7.52'
    pub inlet_composition: String,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    /// 摩尔流量 mol/s
    pub flow_rate: f64,
    /// 反应器附加参数（如 {"volume": 1.0}）
    #[serde(default)]
    pub reactor_params: Option<Map<String, Value>>,
}

fn echo_args(args: &ProcessSimulationArgs) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("process_type".into(), json!(args.process_type));
    m.insert("inlet_composition".into(), json!(args.inlet_composition));
    m.insert("temperature_K".into(), json!(args.temperature_k));
    m.insert("pressure_Pa".into(), json!(args.pressure_pa));
    m.insert("flow_rate_mol_s".into(), json!(args.flow_rate));
    m
}

pub fn run(args: &ProcessSimulationArgs) -> ToolResult {
    if !(args.flow_rate.is_finite() && args.flow_rate > 0.0) {
        return ToolResult::error_with(
            format!(
                "Process simulation failed: flow rate must be positive, got {}",
                args.flow_rate
            ),
            echo_args(args),
        );
    }
    let volume = args
        .reactor_params
        .as_ref()
        .and_then(|p| p.get("volume"))
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    if !(volume.is_finite() && volume > 0.0) {
        return ToolResult::error_with(
            format!("Process simulation failed: reactor volume must be positive, got {}", volume),
            echo_args(args),
        );
    }

    let inlet = match chem::parse_mixture(&args.inlet_composition) {
        Ok(entries) => entries,
        Err(e) => {
            return ToolResult::error_with(
                format!("Process simulation failed: {}", e),
                echo_args(args),
            )
        }
    };

    let outlet = match chem::equilibrium_composition(
        &args.inlet_composition,
        args.temperature_k,
        args.pressure_pa,
    ) {
        Ok(x) => x,
        Err(e) => {
            return ToolResult::error_with(
                format!("Process simulation failed: {}", e),
                echo_args(args),
            )
        }
    };

    // 首个进料物种的转化率：1 - x_out / x_in
    let inlet_total: f64 = inlet.iter().map(|(_, n)| n).sum();
    let (key_species, key_moles) = &inlet[0];
    let x_in = key_moles / inlet_total;
    let x_out = outlet.get(key_species).copied().unwrap_or(0.0);
    let conversion = (1.0 - x_out / x_in).clamp(0.0, 1.0);

    let mut payload = echo_args(args);
    payload.insert("reactor_volume_m3".into(), json!(volume));
    payload.insert("outlet_composition".into(), json!(outlet));
    payload.insert("key_species".into(), json!(key_species));
    payload.insert("conversion".into(), json!(conversion));
    ToolResult::success(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolStatus;

    #[test]
    fn stoichiometric_combustion_fully_converts_key_species() {
        let result = run(&ProcessSimulationArgs {
            process_type: "combustion".into(),
            inlet_composition: "CH4:1, O2:2, N2:7.52".into(),
            temperature_k: 1500.0,
            pressure_pa: 101_325.0,
            flow_rate: 1.0,
            reactor_params: None,
        });
        assert_eq!(result.status, ToolStatus::Success);
        assert!((result.payload["conversion"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        assert!(result.payload["outlet_composition"].as_object().unwrap().contains_key("CO2"));
    }

    #[test]
    fn non_positive_flow_rate_is_error_status() {
        let result = run(&ProcessSimulationArgs {
            process_type: "combustion".into(),
            inlet_composition: "CH4:1, O2:2".into(),
            temperature_k: 1500.0,
            pressure_pa: 101_325.0,
            flow_rate: 0.0,
            reactor_params: None,
        });
        assert_eq!(result.status, ToolStatus::Error);
    }

    #[test]
    fn reactor_params_volume_is_validated_and_echoed() {
        let mut params = Map::new();
        params.insert("volume".into(), json!(2.5));
        let result = run(&ProcessSimulationArgs {
            process_type: "reaction".into(),
            inlet_composition: "CH4:1, O2:2".into(),
            temperature_k: 1500.0,
            pressure_pa: 101_325.0,
            flow_rate: 1.0,
            reactor_params: Some(params),
        });
        assert_eq!(result.status, ToolStatus::Success);
        assert_eq!(result.payload["reactor_volume_m3"], json!(2.5));
    }
}
