// 🖨️ Output - Render a report as CSV lines or JSON

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

use crate::resolver::{Report, Status};

/// Header used when `--header` is passed
pub const CSV_HEADER: [&str; 2] = ["zipcode", "rate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `ZIP,rate` per line, blank rate when unresolved
    #[default]
    Csv,
    /// Array of objects with the resolution status
    Json,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    zipcode: &'a str,
    rate: Option<&'a str>,
    status: Status,
}

/// Write `report` to `out` in the requested format
pub fn write_report<W: Write>(report: &Report, format: OutputFormat, header: bool, out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(report, header, out),
        OutputFormat::Json => write_json(report, out),
    }
}

fn write_csv<W: Write>(report: &Report, header: bool, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

    if header {
        writer.write_record(CSV_HEADER)?;
    }
    for row in &report.rows {
        writer
            .write_record([row.zip.as_str(), row.rate().unwrap_or("")])
            .with_context(|| format!("Failed to write row for {}", row.zip))?;
    }

    writer.flush().context("Failed to flush output")?;
    Ok(())
}

fn write_json<W: Write>(report: &Report, mut out: W) -> Result<()> {
    let rows: Vec<JsonRow> = report
        .rows
        .iter()
        .map(|row| JsonRow {
            zipcode: row.zip.as_str(),
            rate: row.rate(),
            status: row.resolution.status(),
        })
        .collect();

    serde_json::to_writer_pretty(&mut out, &rows).context("Failed to serialize report")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
