use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{PlanError, ValidationIssue, ValidationReport};
use crate::model::LootPlan;

/// Largest accepted sum of tier weights. Each weight unit becomes one
/// top-level list entry per source item.
pub const MAX_WEIGHT_SUM: u64 = u32::MAX as u64;

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: LootPlan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error("schema_violation", path, error.to_string()));
        }
    }

    Ok(report)
}

/// Check the semantic rules a plan must satisfy before generation.
pub fn validate_plan_rules(plan: &LootPlan) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_budget(plan, &mut report);
    validate_rarities(plan, &mut report);
    validate_kinds(plan, &mut report);

    if plan.editor_id_prefix.trim().is_empty() {
        report.push(
            ValidationIssue::warning(
                "editor_id_prefix_empty",
                "/editor_id_prefix",
                "generated editor ids will not be distinguishable from source ids",
            )
            .hint("set editor_id_prefix to a short marker such as LOOT"),
        );
    }

    report
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidatedPlan, ValidationReport> {
    let structural = validate_plan_json(plan_json, plan_schema).map_err(|err| {
        ValidationReport::fatal(ValidationIssue::error(
            "schema_validation_error",
            "/",
            err.to_string(),
        ))
    })?;
    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: LootPlan = serde_json::from_value(plan_json.clone()).map_err(|err| {
        ValidationReport::fatal(ValidationIssue::error("invalid_plan_json", "/", err.to_string()))
    })?;

    let rules = validate_plan_rules(&plan);
    if !rules.is_ok() {
        return Err(rules);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: rules.warnings,
    })
}

fn validate_budget(plan: &LootPlan, report: &mut ValidationReport) {
    if plan.total_budget == 0 {
        report.push(
            ValidationIssue::error(
                "total_budget_zero",
                "/total_budget",
                "total_budget must be greater than zero",
            )
            .hint("the reference configuration uses 240"),
        );
    }

    if plan.max_generated == 0 {
        report.push(ValidationIssue::warning(
            "max_generated_zero",
            "/max_generated",
            "no composite items will be generated",
        ));
    }
}

fn validate_rarities(plan: &LootPlan, report: &mut ValidationReport) {
    if plan.rarities.is_empty() {
        report.push(
            ValidationIssue::error(
                "rarities_empty",
                "/rarities",
                "plan requires at least one rarity tier",
            )
            .hint("add a tier such as { name = \"Magical\", effect_count = 1, weight = 150 }"),
        );
        return;
    }

    let mut seen = HashSet::new();
    for (idx, tier) in plan.rarities.iter().enumerate() {
        let base_path = format!("/rarities/{idx}");
        if tier.name.trim().is_empty() {
            report.push(ValidationIssue::error(
                "rarity_name_empty",
                format!("{base_path}/name"),
                "rarity name must not be empty",
            ));
        } else if !seen.insert(tier.name.as_str()) {
            report.push(
                ValidationIssue::error(
                    "duplicate_rarity",
                    format!("{base_path}/name"),
                    format!("rarity '{}' is declared more than once", tier.name),
                )
                .hint("merge duplicate tiers into a single entry"),
            );
        }

        if tier.effect_count == 0 {
            report.push(ValidationIssue::error(
                "effect_count_zero",
                format!("{base_path}/effect_count"),
                "effect_count must be greater than zero",
            ));
        }
    }

    let weight_sum = plan.tier_weight_sum();
    if weight_sum > MAX_WEIGHT_SUM {
        report.push(
            ValidationIssue::error(
                "weights_overflow",
                "/rarities",
                format!(
                    "rarity weights sum to {weight_sum}, above the limit of {MAX_WEIGHT_SUM}"
                ),
            )
            .hint("every weight is a slot in the top-level list; keep them small"),
        );
    } else if weight_sum == 0 {
        report.push(
            ValidationIssue::error("rarity_weights_zero", "/rarities", "rarity weights must not all be zero")
                .hint("per-tier entry counts are proportional to the weights"),
        );
    } else if weight_sum >= u64::from(plan.total_budget) {
        report.push(
            ValidationIssue::warning(
                "weights_exceed_budget",
                "/rarities",
                format!(
                    "rarity weights sum to {weight_sum}, leaving no slots of {} for the base item",
                    plan.total_budget
                ),
            )
            .hint("raise total_budget so the un-enchanted item stays obtainable"),
        );
    }
}

fn validate_kinds(plan: &LootPlan, report: &mut ValidationReport) {
    if plan.kinds.is_empty() {
        report.push(
            ValidationIssue::error("kinds_empty", "/kinds", "plan requires at least one item kind")
                .hint("set kinds = [\"armor\"]"),
        );
        return;
    }

    let mut seen = HashSet::new();
    for (idx, kind) in plan.kinds.iter().enumerate() {
        if !seen.insert(*kind) {
            report.push(ValidationIssue::warning(
                "duplicate_kind",
                format!("/kinds/{idx}"),
                format!("kind '{kind}' is listed more than once and will be processed once"),
            ));
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
