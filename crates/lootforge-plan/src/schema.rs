use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::LootPlan;

/// Emit the JSON Schema for plan documents.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(LootPlan)
}
