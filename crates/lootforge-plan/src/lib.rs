//! Plan contracts and validation for Lootforge runs.

pub mod errors;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use model::{LootPlan, NamingRules, PLAN_VERSION, RarityTier};
pub use schema::plan_json_schema;
pub use validate::{
    MAX_WEIGHT_SUM, ValidatedPlan, validate_plan, validate_plan_json, validate_plan_rules,
};

use std::path::Path;

/// Load a plan document (TOML or JSON, by extension) as a JSON value.
///
/// The value is meant to be passed to [`validate_plan`].
pub fn load_plan_value(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(toml::from_str(&content)?)
    }
}
