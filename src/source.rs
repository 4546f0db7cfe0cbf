//! The source stage: reads the input in fixed-size chunks and drives the run.

use crate::config::{positive_int, read_token_lines, validate};
use crate::error::{PipelineError, Result};
use crate::metrics::MetricsCollector;
use crate::stage::{Message, Stage};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info, trace};

/// Config token naming the read chunk size.
pub const SIZE_TO_READ: &str = "SIZE_TO_READ";

/// Validated source settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    /// Fixed chunk size in bytes, >= 1.
    pub size_to_read: usize,
}

impl SourceConfig {
    /// Parse and validate the source's own config file.
    pub fn from_file(path: &Path, delimiter: &str) -> Result<Self> {
        let lines = read_token_lines(path, delimiter)?;
        let map = validate(path, &lines, &[SIZE_TO_READ])?;
        Self::from_map(path, &map)
    }

    pub fn from_map(path: &Path, map: &HashMap<String, String>) -> Result<Self> {
        let size_to_read = positive_int(path, map, SIZE_TO_READ)?;
        Ok(Self { size_to_read })
    }
}

/// The producer at the head of the pipeline.
///
/// Owns the input stream for the duration of the run and pushes each full
/// chunk into its consumer; on exhaustion it pushes [`Message::End`]. The
/// consumer is owned directly, so the source → transform → sink shape is
/// fixed at compile time.
pub struct Source<R, C> {
    config: SourceConfig,
    input: R,
    consumer: C,
    metrics: MetricsCollector,
}

impl<R, C> Source<R, C> {
    pub fn new(config: SourceConfig, input: R, consumer: C, metrics: MetricsCollector) -> Self {
        Self {
            config,
            input,
            consumer,
            metrics,
        }
    }

    /// Tear down into the input stream and the downstream chain.
    pub fn into_parts(self) -> (R, C) {
        (self.input, self.consumer)
    }
}

impl<R: Read, C: Stage> Source<R, C> {
    /// Drive the pipeline until end-of-stream or the first failure.
    ///
    /// Each chunk's full journey downstream completes before the next read:
    /// the call chain is strictly synchronous with one chunk in flight. The
    /// fill loop only stops short at true end-of-stream, so a short fill is
    /// the valid final partial chunk of an input whose length is not a
    /// multiple of the chunk size. It is pushed as-is, and the next read
    /// observes exhaustion.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let mut chunk = vec![0u8; self.config.size_to_read];
            let filled = read_full(&mut self.input, &mut chunk).map_err(PipelineError::ReadFailed)?;

            if filled == 0 {
                info!("input exhausted");
                return self.consumer.execute(Message::End);
            }
            if filled < chunk.len() {
                debug!(wanted = chunk.len(), got = filled, "final partial chunk");
                chunk.truncate(filled);
            }

            trace!(bytes = filled, "chunk read");
            self.metrics.add_chunk(filled);
            self.consumer.execute(Message::Chunk(chunk))?;
        }
    }
}

/// Fill `buf` as far as the stream allows and return the byte count.
///
/// Short reads that are not end-of-stream are retried, so a partial fill
/// only ever means the stream ran out mid-chunk.
fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
