//! Writes pipeline results to disk.
//!
//! Tables are CSV with the PascalCase column names downstream tooling
//! expects. The run summary is pretty-printed JSON.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use accident_risk_analytics::render::{projection_risk_rows, risk_rows};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineOutput;

pub const ALL_YEARS_FILE: &str = "risk_all_years.csv";
pub const PROJECTION_FILE: &str = "projection.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Errors that can occur while writing outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File name of the single-year score table.
#[must_use]
pub fn focus_year_file(year: i32) -> String {
    format!("risk_{year}.csv")
}

/// Serializes `rows` as CSV with a header line.
///
/// # Errors
///
/// Returns [`OutputError`] if a row fails to serialize or the writer fails.
pub fn write_csv_to<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), OutputError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

fn write_csv_file<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    write_csv_to(File::create(path)?, rows)?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes every output table and the summary into `dir`, creating it if
/// needed. The single-year table is skipped when it has no rows.
///
/// # Errors
///
/// Returns [`OutputError`] if the directory or any file cannot be written.
pub fn write_outputs(dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(ALL_YEARS_FILE);
    write_csv_file(&path, &risk_rows(&output.all_years))?;
    written.push(path);

    if output.focus_year.is_empty() {
        log::info!("No single-year scores to write");
    } else {
        let path = dir.join(focus_year_file(output.summary.focus_year));
        write_csv_file(&path, &risk_rows(&output.focus_year))?;
        written.push(path);
    }

    let path = dir.join(PROJECTION_FILE);
    write_csv_file(&path, &projection_risk_rows(&output.projection))?;
    written.push(path);

    let path = dir.join(SUMMARY_FILE);
    let mut file = File::create(&path)?;
    serde_json::to_writer_pretty(&mut file, &output.summary)?;
    file.write_all(b"\n")?;
    log::info!("Wrote run summary to {}", path.display());
    written.push(path);

    Ok(written)
}
