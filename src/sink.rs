//! The sink stage: re-buffers incoming bytes and writes the output stream.

use crate::config::{positive_int, read_token_lines, validate};
use crate::error::{PipelineError, Result};
use crate::metrics::MetricsCollector;
use crate::stage::{Message, Stage};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, trace};

/// Config token naming the write buffer capacity.
pub const SIZE_TO_WRITE: &str = "SIZE_TO_WRITE";

/// Validated sink settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Write buffer capacity in bytes, >= 1.
    pub size_to_write: usize,
}

impl SinkConfig {
    /// Parse and validate the sink's own config file.
    pub fn from_file(path: &Path, delimiter: &str) -> Result<Self> {
        let lines = read_token_lines(path, delimiter)?;
        let map = validate(path, &lines, &[SIZE_TO_WRITE])?;
        Self::from_map(path, &map)
    }

    pub fn from_map(path: &Path, map: &HashMap<String, String>) -> Result<Self> {
        let size_to_write = positive_int(path, map, SIZE_TO_WRITE)?;
        Ok(Self { size_to_write })
    }
}

/// The terminal stage: a fixed-capacity buffer in front of the output stream.
///
/// The buffer's capacity equals the configured write size and is allocated
/// when the sink is built. Incoming bytes are appended one at a time; the
/// moment the buffer fills it is flushed (written and reset) before more
/// bytes are accepted. End-of-stream flushes whatever remains, the terminal
/// action of the whole pipeline. Only the sink's own `execute` ever touches
/// the buffer, so the fill cursor invariant `0 <= filled <= capacity` holds
/// throughout.
pub struct Sink<W> {
    output: W,
    buffer: Box<[u8]>,
    filled: usize,
    metrics: MetricsCollector,
}

impl<W> Sink<W> {
    pub fn new(config: SinkConfig, output: W, metrics: MetricsCollector) -> Self {
        Self {
            output,
            buffer: vec![0u8; config.size_to_write].into_boxed_slice(),
            filled: 0,
            metrics,
        }
    }

    /// Bytes currently buffered but not yet written.
    pub fn buffered(&self) -> usize {
        self.filled
    }

    /// Tear down into the output stream.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<W: Write> Sink<W> {
    fn push(&mut self, byte: u8) -> Result<()> {
        self.buffer[self.filled] = byte;
        self.filled += 1;
        if self.filled == self.buffer.len() {
            self.flush()?;
        }
        Ok(())
    }

    /// Write exactly the filled portion, never the unused tail, then reset
    /// the cursor. Nothing buffered means no physical write.
    fn flush(&mut self) -> Result<()> {
        if self.filled == 0 {
            return Ok(());
        }
        self.output
            .write_all(&self.buffer[..self.filled])
            .map_err(PipelineError::WriteFailed)?;
        trace!(bytes = self.filled, "buffer flushed");
        self.metrics.add_flush(self.filled);
        self.filled = 0;
        Ok(())
    }
}

impl<W: Write> Stage for Sink<W> {
    fn execute(&mut self, message: Message) -> Result<()> {
        match message {
            Message::End => {
                info!(bytes = self.filled, "writing remaining data");
                self.flush()
            }
            Message::Chunk(chunk) => {
                for byte in chunk {
                    self.push(byte)?;
                }
                Ok(())
            }
        }
    }
}
