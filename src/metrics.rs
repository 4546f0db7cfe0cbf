//! Execution counters for pipeline runs.
//!
//! A [`MetricsCollector`] is a cheaply cloneable handle shared between the
//! builder and the stages that do I/O. The builder hands one clone to the
//! source and one to the sink; callers keep their own clone and take a
//! [`MetricsSnapshot`] after the run. Observability is injected this way;
//! no component consults process-global state.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Point-in-time view of the run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Bytes read from the input stream.
    pub bytes_read: u64,
    /// Chunks pushed down the pipeline.
    pub chunks: u64,
    /// Bytes physically written to the output stream.
    pub bytes_written: u64,
    /// Physical flushes performed by the sink.
    pub flushes: u64,
}

/// Shared counter handle for one pipeline run.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_chunk(&self, bytes: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.bytes_read += bytes as u64;
        inner.chunks += 1;
    }

    pub(crate) fn add_flush(&self, bytes: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.bytes_written += bytes as u64;
        inner.flushes += 1;
    }

    /// Copy out the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        *self.inner.lock().unwrap()
    }

    /// Print a one-line summary to stdout.
    pub fn print(&self) {
        let s = self.snapshot();
        println!(
            "bytes_read={} chunks={} bytes_written={} flushes={}",
            s.bytes_read, s.chunks, s.bytes_written, s.flushes
        );
    }

    /// Save the counters to `path` as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json).with_context(|| format!("write metrics to {}", path.display()))
    }
}
