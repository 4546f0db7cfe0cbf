//! Pipeline assembly and execution.
//!
//! [`PipelineBuilder`] orchestrates one run end to end: it reads and
//! validates the top-level config, resolves the declared module order,
//! loads each stage's own config through the same parse/validate pair,
//! opens the data streams, wires the typed source → transform → sink chain,
//! and drives it by invoking the source. Both streams are released whatever
//! the run's outcome.

use crate::config::{read_token_lines, validate_with_order};
use crate::error::{PipelineError, Result};
use crate::metrics::MetricsCollector;
use crate::sink::{Sink, SinkConfig};
use crate::source::{Source, SourceConfig};
use crate::stage::StageKind;
use crate::transform::{Transform, TransformConfig};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span};

/// Config token naming the source's sub-config file.
pub const READER: &str = "READER";
/// Config token naming the transform's sub-config file.
pub const EXECUTOR: &str = "EXECUTOR";
/// Config token naming the sink's sub-config file.
pub const WRITER: &str = "WRITER";
/// Config token naming the input data file.
pub const INPUT: &str = "INPUT";
/// Config token naming the output data file.
pub const OUTPUT: &str = "OUTPUT";
/// Config token declaring the module assembly order.
pub const ORDER: &str = "ORDER";

const TOKENS: [&str; 5] = [READER, EXECUTOR, WRITER, INPUT, OUTPUT];

/// Builds and runs one pipeline from a top-level config file.
pub struct PipelineBuilder {
    config_path: PathBuf,
    delimiter: String,
    metrics: MetricsCollector,
}

impl PipelineBuilder {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            delimiter: "=".to_string(),
            metrics: MetricsCollector::new(),
        }
    }

    /// Token delimiter used in all config files, in addition to whitespace.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Handle to the run counters; keep a clone to inspect after [`run`].
    ///
    /// [`run`]: PipelineBuilder::run
    #[must_use]
    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    /// Assemble the pipeline and drive it to completion.
    ///
    /// Setup order: top-level config, module order, per-stage configs, then
    /// streams, so a bad order list fails before any stream is opened. The
    /// streams are always released afterwards; a release failure is surfaced
    /// and takes final precedence over a prior run failure (both are logged).
    pub fn run(self) -> Result<()> {
        let span = info_span!("pipeline", config = %self.config_path.display());
        let _guard = span.enter();

        let lines = read_token_lines(&self.config_path, &self.delimiter)?;
        let (map, order) = validate_with_order(&self.config_path, &lines, &TOKENS, ORDER)?;
        resolve_order(order.as_deref())?;

        // Each stage validates its own config file independently.
        let source_config = SourceConfig::from_file(Path::new(&map[READER]), &self.delimiter)?;
        let transform_config = TransformConfig::from_file(Path::new(&map[EXECUTOR]), &self.delimiter)?;
        let sink_config = SinkConfig::from_file(Path::new(&map[WRITER]), &self.delimiter)?;

        let input_path = PathBuf::from(&map[INPUT]);
        let output_path = PathBuf::from(&map[OUTPUT]);

        let input = File::open(&input_path).map_err(|source| PipelineError::InputStream {
            path: input_path.clone(),
            source,
        })?;
        let output = File::create(&output_path).map_err(|source| PipelineError::OutputStream {
            path: output_path.clone(),
            source,
        })?;

        let sink = Sink::new(sink_config, output, self.metrics.clone());
        let transform = Transform::new(transform_config, sink);
        let mut source = Source::new(source_config, input, transform, self.metrics.clone());
        info!(input = %input_path.display(), output = %output_path.display(), "pipeline wired");

        let run_result = source.run();

        // Recover both streams and release them on every path.
        let (input, transform) = source.into_parts();
        let output = transform.into_consumer().into_output();
        drop(input); // read-only stream, releasing cannot fail
        let release_result = release_output(output, &output_path);

        match (run_result, release_result) {
            (Ok(()), Ok(())) => {
                info!("pipeline finished");
                Ok(())
            }
            (Err(run), Ok(())) => Err(run),
            (run, Err(release)) => {
                if let Err(run) = run {
                    error!(error = %run, "pipeline failed before stream release");
                }
                Err(release)
            }
        }
    }
}

/// Sync the output stream so release failures surface before the drop.
fn release_output(output: File, path: &Path) -> Result<()> {
    output.sync_all().map_err(|source| PipelineError::OutputStream {
        path: path.to_path_buf(),
        source,
    })
}

/// Check a declared module order against the fixed pipeline shape.
///
/// A missing order falls back to the fixed source → transform → sink
/// assembly. A declared order must name each of the three modules exactly
/// once (unrecognized names, duplicates, and wrong counts are construction
/// errors) and, because each stage's consumer type is fixed, the only
/// constructible sequence is reader, executor, writer.
fn resolve_order(order: Option<&[String]>) -> Result<[StageKind; 3]> {
    const SHAPE: [StageKind; 3] = [StageKind::Source, StageKind::Transform, StageKind::Sink];

    let Some(names) = order else {
        return Ok(SHAPE);
    };
    if names.len() != SHAPE.len() {
        return Err(PipelineError::Construction(format!(
            "wrong amount of pipeline modules: expected {}, found {}",
            SHAPE.len(),
            names.len()
        )));
    }

    let mut kinds = Vec::with_capacity(SHAPE.len());
    for name in names {
        let kind = StageKind::from_name(name)
            .ok_or_else(|| PipelineError::Construction(format!("unrecognized module {name}")))?;
        if kinds.contains(&kind) {
            return Err(PipelineError::Construction(format!("duplicate module {name}")));
        }
        kinds.push(kind);
    }

    if kinds != SHAPE {
        return Err(PipelineError::Construction(format!(
            "modules must be ordered {} {} {}",
            SHAPE[0], SHAPE[1], SHAPE[2]
        )));
    }
    Ok(SHAPE)
}
