use std::path::PathBuf;

use lootforge_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsReport;

/// Knobs for evaluating a patched catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateOptions {
    pub strict: bool,
    /// Violations listed in the markdown report.
    pub max_examples: usize,
    pub write_violations: bool,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_examples: 20,
            write_violations: false,
        }
    }
}

/// A failed catalog check. `path` names the checked object, `record` the
/// offending record when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordId>,
}

impl Violation {
    pub fn new(code: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            message: message.into(),
            record: None,
        }
    }

    pub fn at(mut self, record: RecordId) -> Self {
        self.record = Some(record);
        self
    }
}

/// In-memory outcome of [`crate::EvaluationEngine::evaluate`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub metrics: MetricsReport,
    pub violations: Vec<Violation>,
}

/// Outcome of [`crate::EvaluationEngine::run`], with the artifact paths.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub violations_path: Option<PathBuf>,
    pub metrics: MetricsReport,
    pub report: String,
    pub violations: Vec<Violation>,
}
