use lootforge_core::ItemKind;
use serde::{Deserialize, Serialize};

/// Metrics contract version for patch evaluation.
pub const METRICS_VERSION: &str = "0.1";

/// Machine-readable metrics for a patch evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics_version: String,
    pub run_id: String,
    pub evaluated_at: String,
    pub plan_ref: MetricsPlanRef,
    pub kinds: Vec<KindMetrics>,
    pub checks: CheckSummary,
    pub performance: PerformanceMetrics,
}

/// Reference metadata for plan inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsPlanRef {
    pub plan_version: String,
    pub seed: u64,
    pub total_budget: u32,
    pub max_generated: u32,
}

/// Per-kind generation counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindMetrics {
    pub kind: ItemKind,
    pub sources: usize,
    pub items_created: usize,
    pub lists_created: usize,
    pub entries_rewired: usize,
    pub skipped: u64,
}

/// Outcome of every consistency check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSummary {
    pub references: CheckStats,
    pub top_lists: CheckStats,
    pub ceiling: CheckStats,
    pub id_range: CheckStats,
    pub effects: CheckStats,
    pub rewiring: CheckStats,
}

impl CheckSummary {
    /// Rows in report order.
    pub fn rows(&self) -> [(&'static str, &CheckStats); 6] {
        [
            ("references", &self.references),
            ("top_lists", &self.top_lists),
            ("ceiling", &self.ceiling),
            ("id_range", &self.id_range),
            ("effects", &self.effects),
            ("rewiring", &self.rewiring),
        ]
    }

    pub fn total_violations(&self) -> u64 {
        self.rows().iter().map(|(_, stats)| stats.violations).sum()
    }
}

/// Generic check counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    pub checked: u64,
    pub violations: u64,
}

/// Performance timings for the evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub validate_ms: u128,
    pub total_ms: u128,
}
