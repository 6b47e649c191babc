//! 物种热力学性质工具

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::chem;
use crate::tools::ToolResult;

pub const NAME: &str = "get_species_thermodynamic_properties";
pub const DESCRIPTION: &str = "Retrieves enthalpy, entropy, Gibbs free energy and heat capacity \
(J/kmol basis) for a species at a given temperature and pressure.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ThermoPropertiesArgs {
    /// 物种化学式，如 'CO2'、'H2O'
    pub species_name: String,
    pub temperature_k: f64,
    pub pressure_pa: f64,
}

fn echo_args(args: &ThermoPropertiesArgs) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("species".into(), json!(args.species_name));
    m.insert("temperature_K".into(), json!(args.temperature_k));
    m.insert("pressure_Pa".into(), json!(args.pressure_pa));
    m
}

pub fn run(args: &ThermoPropertiesArgs) -> ToolResult {
    match chem::species_thermo(&args.species_name, args.temperature_k, args.pressure_pa) {
        Ok(props) => {
            let mut payload = echo_args(args);
            payload.insert(
                "thermodynamic_properties".into(),
                json!({
                    "enthalpy_kmol": props.enthalpy_kmol,
                    "entropy_kmol": props.entropy_kmol,
                    "gibbs_kmol": props.gibbs_kmol,
                    "cp_kmol": props.cp_kmol,
                }),
            );
            ToolResult::success(payload)
        }
        Err(e) => ToolResult::error_with(
            format!(
                "Could not retrieve thermodynamic properties for '{}': {}",
                args.species_name, e
            ),
            echo_args(args),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolStatus;

    #[test]
    fn properties_object_has_all_four_fields() {
        let result = run(&ThermoPropertiesArgs {
            species_name: "H2O".into(),
            temperature_k: 500.0,
            pressure_pa: 101_325.0,
        });
        assert_eq!(result.status, ToolStatus::Success);
        let props = result.payload["thermodynamic_properties"].as_object().unwrap();
        for key in ["enthalpy_kmol", "entropy_kmol", "gibbs_kmol", "cp_kmol"] {
            assert!(props.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn unknown_species_is_error_status() {
        let result = run(&ThermoPropertiesArgs {
            species_name: "KRYPTONITE".into(),
            temperature_k: 500.0,
            pressure_pa: 101_325.0,
        });
        assert_eq!(result.status, ToolStatus::Error);
    }
}
