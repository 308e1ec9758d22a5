use std::collections::BTreeMap;

use lootforge_core::{ItemKind, RecordId};
use serde::{Deserialize, Serialize};

/// Counts gathered while scanning the catalog for one item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub kind: ItemKind,
    pub lists: usize,
    pub items: usize,
    pub unenchanted: usize,
    pub enchanted: usize,
    pub pool_size: usize,
    pub pool_levels: usize,
    pub unresolved_effects: usize,
}

/// Per-tier outcome across every source item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierReport {
    pub name: String,
    pub effect_count: u32,
    pub weight: u32,
    pub entries_per_source: u64,
    pub planned: u64,
    pub created: u64,
    pub skipped: u64,
}

/// A source entry whose owning list now points at a generated top-level list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewiredSource {
    pub list: RecordId,
    pub source_item: RecordId,
    pub top_list: RecordId,
    pub entries_rewired: usize,
}

/// Structured generation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordId>,
}

/// Report for one item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub kind: ItemKind,
    pub scan: ScanSummary,
    pub quota_per_source: u32,
    pub sources_processed: usize,
    pub lists_created: usize,
    pub items_created: usize,
    pub effects_created: usize,
    pub entries_rewired: usize,
    pub name_fallbacks: u64,
    pub tiers: Vec<TierReport>,
    pub rewired: Vec<RewiredSource>,
    pub skipped_by_code: BTreeMap<String, u64>,
    pub issues: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(scan: ScanSummary) -> Self {
        Self {
            kind: scan.kind,
            scan,
            quota_per_source: 0,
            sources_processed: 0,
            lists_created: 0,
            items_created: 0,
            effects_created: 0,
            entries_rewired: 0,
            name_fallbacks: 0,
            tiers: Vec::new(),
            rewired: Vec::new(),
            skipped_by_code: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, code: &str) {
        *self.skipped_by_code.entry(code.to_string()).or_insert(0) += 1;
    }

    pub fn record_issue(&mut self, issue: GenerationIssue) {
        self.issues.push(issue);
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped_by_code.values().sum()
    }
}

/// Result of a run across every configured item kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub run_id: String,
    pub started_at: String,
    pub seed: u64,
    pub duration_ms: u64,
    pub reports: Vec<GenerationReport>,
}

impl GenerationResult {
    pub fn items_created(&self) -> usize {
        self.reports.iter().map(|report| report.items_created).sum()
    }
}
