#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County aggregation, population fusion, and risk scoring.
//!
//! Turns cleaned incidents into one row per county ([`aggregate`]), joins
//! those rows with population data ([`fusion`]), shapes them into model
//! inputs ([`matrix`]), and converts model predictions into bounded risk
//! scores and decade-forward projections ([`risk`]). [`ranking`] and
//! [`render`] prepare the results for reporting and the map renderer.

pub mod aggregate;
pub mod fusion;
pub mod matrix;
pub mod ranking;
pub mod render;
pub mod risk;

use thiserror::Error;

/// Errors that can occur when feeding rows to or from the model.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A row's feature values do not line up with the feature set.
    #[error("Feature mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch {
        /// Length of the feature set.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },

    /// A prediction vector does not have one entry per row.
    #[error("Prediction length mismatch: {rows} rows, {predictions} predictions")]
    PredictionLength {
        /// Rows being scored.
        rows: usize,
        /// Predictions supplied.
        predictions: usize,
    },
}
