//! 物种摩尔质量查询工具

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map};

use crate::chem;
use crate::tools::ToolResult;

pub const NAME: &str = "get_species_molecular_weight";
pub const DESCRIPTION: &str =
    "Retrieves the molecular weight of a chemical species (e.g. 'CO2', 'H2O', 'CH4').";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MolecularWeightArgs {
    /// 物种化学式，如 'CO2'
    pub species_name: String,
}

pub fn run(args: &MolecularWeightArgs) -> ToolResult {
    match chem::molecular_weight(&args.species_name) {
        Ok(mw) => {
            let mut payload = Map::new();
            payload.insert("species".into(), json!(args.species_name));
            payload.insert("molecular_weight_kg_kmol".into(), json!(mw));
            // kg/kmol 与 g/mol 数值相同
            payload.insert("molecular_weight_g_mol".into(), json!(mw));
            ToolResult::success(payload)
        }
        Err(e) => {
            let mut extra = Map::new();
            extra.insert("species".into(), json!(args.species_name));
            ToolResult::error_with(
                format!(
                    "Species '{}' not found or molecular weight calculation failed: {}",
                    args.species_name, e
                ),
                extra,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolStatus;

    #[test]
    fn both_unit_fields_carry_the_same_number() {
        let result = run(&MolecularWeightArgs {
            species_name: "CH4".into(),
        });
        assert_eq!(result.status, ToolStatus::Success);
        assert_eq!(
            result.payload["molecular_weight_kg_kmol"],
            result.payload["molecular_weight_g_mol"]
        );
    }

    #[test]
    fn unknown_species_is_error_status() {
        let result = run(&MolecularWeightArgs {
            species_name: "Zz9".into(),
        });
        assert_eq!(result.status, ToolStatus::Error);
        assert_eq!(result.payload["species"], serde_json::json!("Zz9"));
    }
}
