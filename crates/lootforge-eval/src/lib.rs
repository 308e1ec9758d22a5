//! Consistency checks for patched catalogs.

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use engine::EvaluationEngine;
pub use errors::EvalError;
pub use metrics::{CheckStats, CheckSummary, KindMetrics, MetricsReport};
pub use model::{EvaluateOptions, Evaluation, EvaluationResult, Violation};
pub use report::render_report;
