use thiserror::Error;

/// Errors emitted by the evaluation engine.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Strict mode found violations; the report files were still written.
    #[error("evaluation found {count} violation(s), first: {first_code}")]
    Violations { count: usize, first_code: String },
    #[error("could not write evaluation artifacts: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode evaluation artifacts: {0}")]
    Json(#[from] serde_json::Error),
}
