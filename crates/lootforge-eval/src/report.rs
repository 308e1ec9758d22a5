use crate::metrics::MetricsReport;
use crate::model::Violation;

/// Render a deterministic markdown report from metrics and violations.
pub fn render_report(metrics: &MetricsReport, violations: &[Violation], max_examples: usize) -> String {
    let mut lines = Vec::new();

    lines.push("# Lootforge Evaluation Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {}", metrics.run_id));
    lines.push(format!("- plan_version: {}", metrics.plan_ref.plan_version));
    lines.push(format!("- seed: {}", metrics.plan_ref.seed));
    lines.push(format!("- total_budget: {}", metrics.plan_ref.total_budget));
    lines.push(format!("- max_generated: {}", metrics.plan_ref.max_generated));
    lines.push(String::new());

    lines.push("## Generated records".to_string());
    lines.push("| kind | sources | items_created | lists_created | entries_rewired | skipped |".to_string());
    lines.push("| --- | --- | --- | --- | --- | --- |".to_string());
    for kind in &metrics.kinds {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            kind.kind,
            kind.sources,
            kind.items_created,
            kind.lists_created,
            kind.entries_rewired,
            kind.skipped
        ));
    }
    lines.push(String::new());

    lines.push("## Check summary".to_string());
    lines.push("| check | checked | violations |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for (name, stats) in metrics.checks.rows() {
        lines.push(format!("| {} | {} | {} |", name, stats.checked, stats.violations));
    }
    lines.push(String::new());

    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            lines.push(format!(
                "- {} [{}]: {}",
                violation.path, violation.code, violation.message
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics, violations));
    lines.join("\n")
}

fn recommendations(metrics: &MetricsReport, violations: &[Violation]) -> Vec<String> {
    let mut lines = Vec::new();
    let checks = &metrics.checks;
    if checks.references.violations > 0 {
        lines.push("- fix dangling references in the source layers before generating.".to_string());
    }
    if checks.top_lists.violations > 0 || checks.rewiring.violations > 0 {
        lines.push("- regenerate from a clean patch layer; a list was edited after generation.".to_string());
    }
    if checks.ceiling.violations > 0 {
        lines.push("- lower tier weights or raise max_generated.".to_string());
    }
    if metrics.kinds.iter().any(|kind| kind.skipped > 0) {
        lines.push("- add enchanted items at low levels or reduce tier effect counts to avoid skipped draws.".to_string());
    }
    if violations.is_empty() {
        lines.push("- no violations detected; compare metrics across seeds for drift.".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use lootforge_core::{ItemKind, RecordId};

    use super::*;
    use crate::metrics::{CheckSummary, KindMetrics, MetricsPlanRef, PerformanceMetrics};

    fn metrics(skipped: u64) -> MetricsReport {
        MetricsReport {
            metrics_version: "0.1".to_string(),
            run_id: "run-1".to_string(),
            evaluated_at: "2026-01-01T00:00:00+00:00".to_string(),
            plan_ref: MetricsPlanRef {
                plan_version: "0.1".to_string(),
                seed: 42,
                total_budget: 240,
                max_generated: 100,
            },
            kinds: vec![KindMetrics {
                kind: ItemKind::Armor,
                sources: 2,
                items_created: 10,
                lists_created: 10,
                entries_rewired: 2,
                skipped,
            }],
            checks: CheckSummary::default(),
            performance: PerformanceMetrics {
                validate_ms: 0,
                total_ms: 0,
            },
        }
    }

    #[test]
    fn clean_report_lists_kinds_and_checks() {
        let report = render_report(&metrics(0), &[], 5);
        assert!(report.starts_with("# Lootforge Evaluation Report"));
        assert!(report.contains("| armor | 2 | 10 | 10 | 2 | 0 |"));
        assert!(report.contains("| rewiring | 0 | 0 |"));
        assert!(report.contains("no violations detected"));
        assert!(!report.contains("## Top violations"));
    }

    #[test]
    fn violations_are_truncated() {
        let violations: Vec<Violation> = (1..=4)
            .map(|id| {
                Violation::new(
                    "dangling_entry",
                    format!("records/{}", RecordId(id)),
                    "entry resolves to nothing",
                )
                .at(RecordId(id))
            })
            .collect();
        let report = render_report(&metrics(3), &violations, 2);
        assert_eq!(report.matches("[dangling_entry]").count(), 2);
        assert!(report.contains("reduce tier effect counts"));
    }
}
