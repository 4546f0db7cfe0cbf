//! Testing utilities for assembling pipeline fixtures.
//!
//! A pipeline run touches five files: the top-level config, three per-stage
//! configs, and the input data. [`PipelineFixture`] lays all of them out in
//! a temp directory so tests (and examples) can exercise a full run with a
//! few lines:
//!
//! ```no_run
//! use rotopipe::PipelineBuilder;
//! use rotopipe::testing::PipelineFixture;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fixture = PipelineFixture::builder()
//!     .input(&[0x01, 0x80, 0xFF])
//!     .size_to_read(2)
//!     .shift(1, "left")
//!     .size_to_write(2)
//!     .build()?;
//!
//! PipelineBuilder::new(fixture.config_path()).run()?;
//! assert_eq!(fixture.read_output()?, vec![0x02, 0x01, 0xFF]);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `contents` to `dir/name` and return the full path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Fluent builder for [`PipelineFixture`].
pub struct FixtureBuilder {
    input: Vec<u8>,
    size_to_read: usize,
    shift_amount: usize,
    shift_direction: String,
    size_to_write: usize,
    order: Option<String>,
}

impl Default for FixtureBuilder {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            size_to_read: 1,
            shift_amount: 1,
            shift_direction: "left".to_string(),
            size_to_write: 1,
            order: None,
        }
    }
}

impl FixtureBuilder {
    #[must_use]
    pub fn input(mut self, bytes: &[u8]) -> Self {
        self.input = bytes.to_vec();
        self
    }

    #[must_use]
    pub fn size_to_read(mut self, size: usize) -> Self {
        self.size_to_read = size;
        self
    }

    #[must_use]
    pub fn shift(mut self, amount: usize, direction: &str) -> Self {
        self.shift_amount = amount;
        self.shift_direction = direction.to_string();
        self
    }

    #[must_use]
    pub fn size_to_write(mut self, size: usize) -> Self {
        self.size_to_write = size;
        self
    }

    /// Add an explicit `ORDER` line, e.g. `"reader executor writer"`.
    #[must_use]
    pub fn order(mut self, names: &str) -> Self {
        self.order = Some(names.to_string());
        self
    }

    /// Write all five files into a fresh temp directory.
    pub fn build(self) -> io::Result<PipelineFixture> {
        let dir = TempDir::new()?;
        let root = dir.path();

        let reader = write_file(root, "reader.cfg", &format!("SIZE_TO_READ = {}\n", self.size_to_read))?;
        let executor = write_file(
            root,
            "executor.cfg",
            &format!(
                "SHIFT_AMOUNT = {}\nSHIFT_DIRECTION = {}\n",
                self.shift_amount, self.shift_direction
            ),
        )?;
        let writer = write_file(root, "writer.cfg", &format!("SIZE_TO_WRITE = {}\n", self.size_to_write))?;

        let input = root.join("input.bin");
        fs::write(&input, &self.input)?;
        let output = root.join("output.bin");

        let mut top = format!(
            "READER = {}\nEXECUTOR = {}\nWRITER = {}\nINPUT = {}\nOUTPUT = {}\n",
            reader.display(),
            executor.display(),
            writer.display(),
            input.display(),
            output.display()
        );
        if let Some(order) = &self.order {
            top.push_str(&format!("ORDER = {order}\n"));
        }
        let config = write_file(root, "pipeline.cfg", &top)?;

        Ok(PipelineFixture {
            dir,
            config,
            input,
            output,
        })
    }
}

/// A complete on-disk config tree for one pipeline run.
pub struct PipelineFixture {
    dir: TempDir,
    config: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

impl PipelineFixture {
    #[must_use]
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    /// Root of the fixture's temp directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config
    }

    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Read the produced output file.
    pub fn read_output(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.output)
    }
}
