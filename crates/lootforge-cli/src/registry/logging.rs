use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Human-readable events go to stderr, filtered by `RUST_LOG`. With
/// `logs_path` every event is also appended as one JSON object per line.
pub fn init_logging(logs_path: Option<&Path>) -> RegistryResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);

    let ndjson_layer = logs_path
        .map(NdjsonSink::open)
        .transpose()?
        .map(|sink| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .with_current_span(false)
                .with_writer(move || sink.clone())
        });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(ndjson_layer)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}

/// Append-only `logs.ndjson` handle shared by every writer the layer makes.
#[derive(Clone)]
struct NdjsonSink(Arc<Mutex<File>>);

impl NdjsonSink {
    fn open(path: &Path) -> RegistryResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(RegistryError::io(path))?;
        Ok(Self(Arc::new(Mutex::new(file))))
    }

    fn with_file<T>(&self, op: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        op(&mut file)
    }
}

impl Write for NdjsonSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}
