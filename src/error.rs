//! Error taxonomy for pipeline setup and execution.
//!
//! Every fallible step returns a [`PipelineError`]; the first non-success
//! result aborts the current phase and propagates to the caller. There are
//! no retries anywhere in the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A config file could not be opened or read.
    #[error("cannot read config {path}: {source}")]
    ConfigGrammar {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file parsed, but its content is invalid: a missing,
    /// duplicate, or malformed token, or an out-of-range value.
    #[error("config {path}: {reason}")]
    ConfigSemantic { path: PathBuf, reason: String },

    /// The declared module order cannot produce a valid pipeline.
    #[error("pipeline construction failed: {0}")]
    Construction(String),

    /// The input stream could not be opened.
    #[error("input stream {path}: {source}")]
    InputStream {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output stream could not be opened or released.
    #[error("output stream {path}: {source}")]
    OutputStream {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from the input stream failed mid-run.
    #[error("failed to read input: {0}")]
    ReadFailed(#[source] io::Error),

    /// Writing to the output stream failed mid-run.
    #[error("failed to write output: {0}")]
    WriteFailed(#[source] io::Error),
}
