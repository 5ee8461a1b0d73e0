#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading options and row-loss accounting types.
//!
//! Every stage that can drop rows reports a [`StageLoss`] so that a run
//! can be audited for how many rows were lost, and where.

use serde::{Deserialize, Serialize};

/// Options for reading a source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Maximum number of records to read (useful for testing).
    pub limit: Option<u64>,
    /// Number of leading lines to discard before the column-label line.
    pub skip_rows: usize,
}

/// Row counts entering and leaving one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLoss {
    /// Stage name (e.g. `"geo-required"`).
    pub stage: String,
    /// Rows handed to the stage.
    pub rows_in: u64,
    /// Rows the stage kept.
    pub rows_out: u64,
}

impl StageLoss {
    #[must_use]
    pub fn new(stage: &str, rows_in: usize, rows_out: usize) -> Self {
        Self {
            stage: stage.to_string(),
            rows_in: rows_in as u64,
            rows_out: rows_out as u64,
        }
    }

    /// Rows dropped by the stage.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.rows_in.saturating_sub(self.rows_out)
    }

    /// Logs the loss at `info` level.
    pub fn log(&self) {
        log::info!(
            "{}: kept {}/{} rows ({} dropped)",
            self.stage,
            self.rows_out,
            self.rows_in,
            self.dropped()
        );
    }
}

/// Result of running the record cleaner over a raw incident table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    /// Rows dropped for a missing county, state, latitude, or longitude.
    pub geo_required: StageLoss,
    /// Rows dropped for an unparseable start or end timestamp.
    pub time_valid: StageLoss,
    /// Rows dropped because a numeric field failed coercion.
    pub numeric_valid: StageLoss,
}

impl CleaningReport {
    /// The three filters in the order they are applied.
    #[must_use]
    pub fn stages(&self) -> [&StageLoss; 3] {
        [&self.geo_required, &self.time_valid, &self.numeric_valid]
    }

    /// Total rows dropped across all filters.
    #[must_use]
    pub fn total_dropped(&self) -> u64 {
        self.stages().iter().map(|s| s.dropped()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_is_difference() {
        let loss = StageLoss::new("geo-required", 10, 7);
        assert_eq!(loss.dropped(), 3);
    }

    #[test]
    fn report_sums_stages() {
        let report = CleaningReport {
            geo_required: StageLoss::new("geo-required", 10, 8),
            time_valid: StageLoss::new("time-valid", 8, 7),
            numeric_valid: StageLoss::new("numeric-valid", 7, 4),
        };
        assert_eq!(report.total_dropped(), 6);
    }
}
