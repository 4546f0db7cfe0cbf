use anyhow::Result;
use clap::Parser;
use rotopipe::PipelineBuilder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run a configuration-driven byte-rotation pipeline.
#[derive(Parser)]
#[command(name = "rotopipe", version, about)]
struct Cli {
    /// Path to the top-level pipeline config file.
    config: PathBuf,

    /// Token delimiter used in config files, in addition to whitespace.
    #[arg(long, default_value = "=")]
    delimiter: String,

    /// Write execution counters to this file as JSON after the run.
    #[arg(long)]
    metrics: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let builder = PipelineBuilder::new(&cli.config).delimiter(cli.delimiter.as_str());
    let metrics = builder.metrics();

    // Counters are dumped even for failed runs; partial output may exist.
    let run_result = builder.run();
    if let Some(path) = &cli.metrics {
        metrics.save_to_file(path)?;
    }
    run_result.map_err(Into::into)
}
