//! # rotopipe
//!
//! A **configuration-driven byte-processing pipeline**: a source reads an
//! input file in fixed-size chunks, a transform applies a cyclic per-byte
//! bit rotation, and a sink re-buffers the result and writes the output
//! file. The whole assembly (which stages run, in what order, with which
//! settings and data files) is declared in small text config files.
//!
//! ## Quick start
//!
//! A top-level config names the per-stage configs and the data files:
//!
//! ```text
//! READER   = reader.cfg
//! EXECUTOR = executor.cfg
//! WRITER   = writer.cfg
//! INPUT    = data.bin
//! OUTPUT   = out.bin
//! ORDER    = reader executor writer
//! ```
//!
//! with `reader.cfg` holding `SIZE_TO_READ`, `executor.cfg` holding
//! `SHIFT_AMOUNT` and `SHIFT_DIRECTION` (`left`/`right`/`-1`/`1`), and
//! `writer.cfg` holding `SIZE_TO_WRITE`. Then:
//!
//! ```no_run
//! use rotopipe::PipelineBuilder;
//!
//! # fn main() -> rotopipe::Result<()> {
//! let builder = PipelineBuilder::new("pipeline.cfg");
//! let metrics = builder.metrics();
//! builder.run()?;
//! metrics.print();
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution model
//!
//! Execution is a strictly synchronous push chain: the source reads one
//! chunk, calls the transform, which calls the sink, and only when that
//! chunk has fully landed does the source read the next one. End-of-stream
//! is a dedicated [`Message::End`] signal, never an empty chunk. The first
//! error anywhere unwinds back through the chain and terminates the run;
//! there are no retries.
//!
//! The three-stage shape is fixed at compile time: the builder wires
//! [`Source`] → [`Transform`] → [`Sink`] by ownership, and the declared
//! `ORDER` list is validated against that shape before any stream is
//! opened.
//!
//! ## Module overview
//!
//! - [`config`] - config file tokenizing and semantic validation
//! - [`stage`] - the [`Message`]/[`Stage`] seam between pipeline modules
//! - [`source`], [`transform`], [`sink`] - the three stages
//! - [`builder`] - assembly, wiring, and the run loop
//! - [`metrics`] - injected execution counters
//! - [`error`] - the error taxonomy
//! - [`testing`] - temp-dir config fixtures for tests

pub mod builder;
pub mod config;
pub mod error;
pub mod metrics;
pub mod sink;
pub mod source;
pub mod stage;
pub mod testing;
pub mod transform;

pub use builder::PipelineBuilder;
pub use error::{PipelineError, Result};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use sink::{Sink, SinkConfig};
pub use source::{Source, SourceConfig};
pub use stage::{Message, Stage, StageKind};
pub use transform::{Direction, Transform, TransformConfig};
