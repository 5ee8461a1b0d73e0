#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading, cleaning, and feature derivation for traffic incident data.
//!
//! The incident pipeline runs [`load`] → [`clean`] → [`features`]: raw CSV
//! rows are read as strings, filtered down to rows whose required fields
//! validate, and enriched with time-of-day and day-of-week features. The
//! population extract is loaded here too, as an uninterpreted
//! spreadsheet grid for the geography crate to sniff and build.

pub mod clean;
pub mod features;
pub mod load;
pub mod parsing;
pub mod progress;

use thiserror::Error;

/// Errors that can occur while loading source data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the source header.
    #[error("Missing required column: {column}")]
    MissingField {
        /// Name of the absent column.
        column: String,
    },

    /// The file has no column-label line.
    #[error("No header row found after skipping {skipped} line(s)")]
    NoHeader {
        /// Number of leading lines that were skipped.
        skipped: usize,
    },
}
