use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use tracing::info;

use slcsp::{pipeline, write_report, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries only the result.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
        )
        .init();

    info!(
        version = slcsp::VERSION,
        zips = %config.zips.display(),
        plans = %config.plans.display(),
        targets = %config.targets.display(),
        strict = config.strict,
        "starting slcsp"
    );

    let report = pipeline::run(&config).await?;

    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_report(&report, config.format, config.header, BufWriter::new(file))?;
            info!(rows = report.len(), path = %path.display(), "report written");
        }
        None => {
            let stdout = io::stdout();
            write_report(&report, config.format, config.header, stdout.lock())?;
        }
    }

    Ok(())
}
