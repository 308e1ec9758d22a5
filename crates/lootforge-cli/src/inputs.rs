use std::path::Path;

use lootforge_core::{Catalog, CatalogSnapshot};
use lootforge_plan::{LootPlan, ValidatedPlan, load_plan_value, plan_json_schema, validate_plan};

use crate::CliError;

/// Name of the writable layer generated records land in.
pub const PATCH_LAYER_NAME: &str = "LootforgePatch";

/// Load and validate a plan; without a path the default plan is used.
pub fn load_plan(path: Option<&Path>) -> Result<ValidatedPlan, CliError> {
    let Some(path) = path else {
        return Ok(ValidatedPlan {
            plan: LootPlan::default(),
            warnings: Vec::new(),
        });
    };

    let value = load_plan_value(path)?;
    let schema = serde_json::to_value(plan_json_schema())?;
    validate_plan(&value, &schema)
        .map_err(|report| CliError::InvalidPlan(report.error_summary()))
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let snapshot: CatalogSnapshot = serde_json::from_str(&contents)?;
    Ok(Catalog::from_snapshot(snapshot, PATCH_LAYER_NAME)?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("lootforge_cli_inputs_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn missing_plan_path_uses_defaults() {
        let validated = load_plan(None).expect("default plan");
        assert_eq!(validated.plan, LootPlan::default());
    }

    #[test]
    fn toml_plan_overrides_defaults() {
        let path = temp_file(
            "plan.toml",
            r#"
seed = 7
max_generated = 500
kinds = ["armor", "weapon"]

[[rarities]]
name = "Magical"
effect_count = 1
weight = 10
"#,
        );
        let validated = load_plan(Some(&path)).expect("plan");
        assert_eq!(validated.plan.seed, 7);
        assert_eq!(validated.plan.max_generated, 500);
        assert_eq!(validated.plan.rarities.len(), 1);
        assert_eq!(validated.plan.total_budget, 240);
    }

    #[test]
    fn invalid_plan_lists_issue_codes() {
        let path = temp_file("plan.toml", "total_budget = 0\nrarities = []\n");
        let err = load_plan(Some(&path)).expect_err("invalid plan");
        let message = err.to_string();
        assert!(message.contains("total_budget_zero"), "{message}");
        assert!(message.contains("rarities_empty"), "{message}");
    }

    #[test]
    fn catalog_snapshot_loads_into_layers() {
        let path = temp_file(
            "catalog.json",
            r#"{"layers":[{"name":"Base","items":[],"lists":[{"id":5,"entries":[]}]}]}"#,
        );
        let catalog = load_catalog(&path).expect("catalog");
        assert_eq!(catalog.layers().len(), 1);
        assert_eq!(catalog.patch().name, PATCH_LAYER_NAME);
        assert_eq!(catalog.source_max_id().0, 5);
    }
}
