//! The stage seam shared by the three pipeline modules.

use crate::error::Result;
use std::fmt;

/// One unit of data flowing down the pipeline, or the end-of-stream signal.
///
/// A dedicated `End` variant keeps "no more data" distinct from a chunk, so
/// a zero-length chunk can never be mistaken for exhaustion. Stages never
/// push an empty `Chunk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Chunk(Vec<u8>),
    End,
}

/// A pipeline stage that accepts data pushed by its producer.
///
/// `execute` handles one message fully, including forwarding downstream,
/// before returning. The first error unwinds back to the source's read loop
/// and terminates the run; there is no other cancellation channel.
pub trait Stage {
    fn execute(&mut self, message: Message) -> Result<()>;
}

/// The three stage roles a declared module order may name.
///
/// The pipeline shape is fixed: a simple source → transform → sink path.
/// The builder wires that path with typed ownership, so `StageKind` exists
/// only to check the order list, not to drive runtime dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Source,
    Transform,
    Sink,
}

impl StageKind {
    /// Case-insensitive match against the configured module names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "reader" => Some(Self::Source),
            "executor" => Some(Self::Transform),
            "writer" => Some(Self::Sink),
            _ => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "reader",
            Self::Transform => "executor",
            Self::Sink => "writer",
        };
        f.write_str(name)
    }
}
