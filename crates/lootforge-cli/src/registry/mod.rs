//! Run directory layout and the log sinks attached to it.

mod logging;
mod run;

use std::path::PathBuf;

pub use logging::init_logging;
pub use run::{RunContext, start_run, write_generation_report, write_patch};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("logging already initialized: {0}")]
    Logging(String),
}

impl RegistryError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
