use std::path::Path;
use std::time::Instant;

use lootforge_core::{Catalog, EffectRecord, RecordId, SelectionList, WorldModel, validate_catalog};
use lootforge_generate::{GenerationReport, GenerationResult};
use lootforge_plan::LootPlan;
use tracing::{info, warn};

use crate::errors::EvalError;
use crate::metrics::{
    CheckStats, CheckSummary, KindMetrics, METRICS_VERSION, MetricsPlanRef, MetricsReport,
    PerformanceMetrics,
};
use crate::model::{EvaluateOptions, Evaluation, EvaluationResult, Violation};
use crate::report::render_report;

/// Evaluate a patched catalog against the plan and generation result.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    options: EvaluateOptions,
}

impl EvaluationEngine {
    pub fn new(options: EvaluateOptions) -> Self {
        Self { options }
    }

    /// Run every check in memory.
    pub fn evaluate(&self, catalog: &Catalog, plan: &LootPlan, result: &GenerationResult) -> Evaluation {
        let total_start = Instant::now();
        let mut violations = Vec::new();
        let mut checks = CheckSummary::default();

        check_references(catalog, &mut checks.references, &mut violations);
        for report in &result.reports {
            check_top_lists(catalog, plan, report, &mut checks.top_lists, &mut violations);
            check_ceiling(plan, report, &mut checks.ceiling, &mut violations);
            check_rewiring(catalog, report, &mut checks.rewiring, &mut violations);
        }
        check_id_range(catalog, &mut checks.id_range, &mut violations);
        check_effects(catalog, &mut checks.effects, &mut violations);

        sort_violations(&mut violations);
        let validate_ms = total_start.elapsed().as_millis();

        let metrics = MetricsReport {
            metrics_version: METRICS_VERSION.to_string(),
            run_id: result.run_id.clone(),
            evaluated_at: chrono::Utc::now().to_rfc3339(),
            plan_ref: MetricsPlanRef {
                plan_version: plan.plan_version.clone(),
                seed: result.seed,
                total_budget: plan.total_budget,
                max_generated: plan.max_generated,
            },
            kinds: result.reports.iter().map(kind_metrics).collect(),
            checks,
            performance: PerformanceMetrics {
                validate_ms,
                total_ms: total_start.elapsed().as_millis(),
            },
        };

        if violations.is_empty() {
            info!(run_id = %metrics.run_id, "evaluation passed");
        } else {
            warn!(run_id = %metrics.run_id, violations = violations.len(), "evaluation found violations");
        }

        Evaluation { metrics, violations }
    }

    /// Evaluate and write `eval_metrics.json` and `eval_report.md` into `out_dir`.
    pub fn run(
        &self,
        catalog: &Catalog,
        plan: &LootPlan,
        result: &GenerationResult,
        out_dir: &Path,
    ) -> Result<EvaluationResult, EvalError> {
        let Evaluation {
            metrics,
            violations,
        } = self.evaluate(catalog, plan, result);

        let report = render_report(&metrics, &violations, self.options.max_examples);
        std::fs::create_dir_all(out_dir)?;

        let metrics_path = out_dir.join("eval_metrics.json");
        std::fs::write(&metrics_path, serde_json::to_vec_pretty(&metrics)?)?;

        let report_path = out_dir.join("eval_report.md");
        std::fs::write(&report_path, report.as_bytes())?;

        let violations_path = if self.options.write_violations {
            let path = out_dir.join("violations.json");
            std::fs::write(&path, serde_json::to_vec_pretty(&violations)?)?;
            Some(path)
        } else {
            None
        };

        if self.options.strict && !violations.is_empty() {
            return Err(EvalError::Violations {
                count: violations.len(),
                first_code: violations[0].code.clone(),
            });
        }

        Ok(EvaluationResult {
            metrics_path,
            report_path,
            violations_path,
            metrics,
            report,
            violations,
        })
    }
}

fn kind_metrics(report: &GenerationReport) -> KindMetrics {
    KindMetrics {
        kind: report.kind,
        sources: report.sources_processed,
        items_created: report.items_created,
        lists_created: report.lists_created,
        entries_rewired: report.entries_rewired,
        skipped: report.skipped_total(),
    }
}

fn check_references(catalog: &Catalog, stats: &mut CheckStats, violations: &mut Vec<Violation>) {
    stats.checked += catalog.winning_overrides::<SelectionList>().len() as u64;
    for issue in validate_catalog(catalog) {
        stats.violations += 1;
        violations.push(
            Violation::new(
                issue.code,
                format!("records/{}", issue.record),
                issue.message,
            )
            .at(issue.record),
        );
    }
}

fn check_top_lists(
    catalog: &Catalog,
    plan: &LootPlan,
    report: &GenerationReport,
    stats: &mut CheckStats,
    violations: &mut Vec<Violation>,
) {
    let expected = plan.top_level_entries() as usize;
    for rewired in &report.rewired {
        stats.checked += 1;
        match catalog.resolve::<SelectionList>(rewired.top_list) {
            Some(top) if top.entries.len() == expected => {}
            Some(top) => {
                stats.violations += 1;
                violations.push(
                    Violation::new(
                        "top_list_size",
                        format!("lists/{}", rewired.top_list),
                        format!(
                            "top-level list holds {} entries, expected {expected}",
                            top.entries.len()
                        ),
                    )
                    .at(rewired.top_list),
                );
            }
            None => {
                stats.violations += 1;
                violations.push(
                    Violation::new(
                        "top_list_missing",
                        format!("lists/{}", rewired.top_list),
                        "reported top-level list does not exist",
                    )
                    .at(rewired.top_list),
                );
            }
        }
    }
}

fn check_ceiling(
    plan: &LootPlan,
    report: &GenerationReport,
    stats: &mut CheckStats,
    violations: &mut Vec<Violation>,
) {
    stats.checked += 1;
    if report.items_created as u64 > u64::from(plan.max_generated) {
        stats.violations += 1;
        violations.push(Violation::new(
            "ceiling_exceeded",
            format!("kinds/{}", report.kind),
            format!(
                "{} composite {} item(s) created, ceiling is {}",
                report.items_created, report.kind, plan.max_generated
            ),
        ));
    }
}

fn check_rewiring(
    catalog: &Catalog,
    report: &GenerationReport,
    stats: &mut CheckStats,
    violations: &mut Vec<Violation>,
) {
    for rewired in &report.rewired {
        stats.checked += 1;
        let Some(list) = catalog.resolve::<SelectionList>(rewired.list) else {
            stats.violations += 1;
            violations.push(
                Violation::new(
                    "rewired_list_missing",
                    format!("lists/{}", rewired.list),
                    "rewired list does not exist",
                )
                .at(rewired.list),
            );
            continue;
        };

        let stale = list
            .entries
            .iter()
            .filter(|entry| entry.reference == rewired.source_item)
            .count();
        let pointing = list
            .entries
            .iter()
            .filter(|entry| entry.reference == rewired.top_list)
            .count();
        if stale > 0 || pointing < rewired.entries_rewired {
            stats.violations += 1;
            violations.push(
                Violation::new(
                    "entry_not_rewired",
                    format!("lists/{}", rewired.list),
                    format!(
                        "{stale} entry(ies) still reference item {}, {pointing} of {} point at top-level list {}",
                        rewired.source_item, rewired.entries_rewired, rewired.top_list
                    ),
                )
                .at(rewired.list),
            );
        }
    }
}

/// Patch records at or below the source maximum must be overrides of an
/// existing record.
fn check_id_range(catalog: &Catalog, stats: &mut CheckStats, violations: &mut Vec<Violation>) {
    let patch = catalog.patch();
    let ids = patch
        .items
        .keys()
        .chain(patch.effects.keys())
        .chain(patch.lists.keys())
        .copied();

    for id in ids {
        stats.checked += 1;
        if catalog.is_generated(id) || is_override(catalog, id) {
            continue;
        }
        stats.violations += 1;
        violations.push(
            Violation::new(
                "id_not_above_source",
                format!("records/{id}"),
                format!(
                    "new record {id} is not above the source maximum {}",
                    catalog.source_max_id()
                ),
            )
            .at(id),
        );
    }
}

fn is_override(catalog: &Catalog, id: RecordId) -> bool {
    catalog.layers().iter().any(|layer| layer.contains_id(id))
}

fn check_effects(catalog: &Catalog, stats: &mut CheckStats, violations: &mut Vec<Violation>) {
    for item in catalog.patch().items.values() {
        if !catalog.is_generated(item.id) {
            continue;
        }
        stats.checked += 1;
        let resolved = item
            .object_effect
            .and_then(|effect| catalog.resolve::<EffectRecord>(effect));
        if resolved.is_none() {
            stats.violations += 1;
            violations.push(
                Violation::new(
                    "generated_effect_missing",
                    format!("items/{}", item.id),
                    "generated item has no resolvable object effect",
                )
                .at(item.id),
            );
        }
    }
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (a.code.as_str(), a.path.as_str(), a.record).cmp(&(b.code.as_str(), b.path.as_str(), b.record))
    });
}
