//! The transform stage: cyclic per-byte bit rotation.

use crate::config::{positive_int, read_token_lines, validate};
use crate::error::{PipelineError, Result};
use crate::stage::{Message, Stage};
use std::collections::HashMap;
use std::path::Path;
use tracing::trace;

/// Config token naming the rotation amount.
pub const SHIFT_AMOUNT: &str = "SHIFT_AMOUNT";
/// Config token naming the rotation direction.
pub const SHIFT_DIRECTION: &str = "SHIFT_DIRECTION";

/// Rotation direction for the per-byte shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Accepts `left`/`right` case-insensitively, or the numeric forms
    /// `-1` (left) and `1` (right) exactly.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("left") || raw == "-1" {
            Some(Self::Left)
        } else if raw.eq_ignore_ascii_case("right") || raw == "1" {
            Some(Self::Right)
        } else {
            None
        }
    }

    /// Rotate `byte` within its 8 bits by `amount` positions.
    ///
    /// Amounts are taken modulo 8, so rotating by `k` and by `k % 8` are
    /// identical, and left-by-k undoes right-by-k.
    pub fn rotate(self, byte: u8, amount: usize) -> u8 {
        let n = (amount % 8) as u32;
        match self {
            Self::Left => byte.rotate_left(n),
            Self::Right => byte.rotate_right(n),
        }
    }
}

/// Validated transform settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    /// Rotation amount, >= 1 (applied modulo 8).
    pub shift_amount: usize,
    pub direction: Direction,
}

impl TransformConfig {
    /// Parse and validate the transform's own config file.
    pub fn from_file(path: &Path, delimiter: &str) -> Result<Self> {
        let lines = read_token_lines(path, delimiter)?;
        let map = validate(path, &lines, &[SHIFT_AMOUNT, SHIFT_DIRECTION])?;
        Self::from_map(path, &map)
    }

    pub fn from_map(path: &Path, map: &HashMap<String, String>) -> Result<Self> {
        let shift_amount = positive_int(path, map, SHIFT_AMOUNT)?;
        let raw = map.get(SHIFT_DIRECTION).map(String::as_str).unwrap_or("");
        let direction = Direction::parse(raw).ok_or_else(|| PipelineError::ConfigSemantic {
            path: path.to_path_buf(),
            reason: format!("invalid {SHIFT_DIRECTION} value: {raw}"),
        })?;
        Ok(Self {
            shift_amount,
            direction,
        })
    }
}

/// The middle stage: rotates every byte of each chunk, then forwards it.
///
/// Pure apart from forwarding: no state beyond the config, and chunks are
/// independent of one another. End-of-stream passes through untouched.
pub struct Transform<C> {
    config: TransformConfig,
    consumer: C,
}

impl<C> Transform<C> {
    pub fn new(config: TransformConfig, consumer: C) -> Self {
        Self { config, consumer }
    }

    pub fn into_consumer(self) -> C {
        self.consumer
    }

    fn apply(&self, chunk: &mut [u8]) {
        for byte in chunk.iter_mut() {
            *byte = self.config.direction.rotate(*byte, self.config.shift_amount);
        }
    }
}

impl<C: Stage> Stage for Transform<C> {
    fn execute(&mut self, message: Message) -> Result<()> {
        match message {
            Message::End => self.consumer.execute(Message::End),
            Message::Chunk(mut chunk) => {
                self.apply(&mut chunk);
                trace!(bytes = chunk.len(), "chunk rotated");
                self.consumer.execute(Message::Chunk(chunk))
            }
        }
    }
}
