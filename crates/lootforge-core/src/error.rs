use thiserror::Error;

use crate::ids::RecordId;

/// Core error type shared across Lootforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog violates internal invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    /// A record id could not be resolved against the winning overrides.
    #[error("unknown record: {0}")]
    UnknownRecord(RecordId),
    /// A record with the same id already exists in the patch layer.
    #[error("duplicate record: {0}")]
    DuplicateRecord(RecordId),
    /// The identifier allocator ran past the id space.
    #[error("record id space exhausted")]
    IdSpaceExhausted,
}

/// Convenience alias for results returned by Lootforge crates.
pub type Result<T> = std::result::Result<T, Error>;
