#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Regression learner for county accident rates.
//!
//! The pipeline only depends on the [`Learner`] and [`Predictor`] traits:
//! train on a feature matrix and target vector, then predict and report
//! per-feature importances. [`ridge::RidgeRegression`] is the provided
//! implementation. [`split`] and [`metrics`] hold the held-out evaluation
//! around it.

pub mod metrics;
pub mod ridge;
pub mod split;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while training or predicting.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Too few rows to fit a model.
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Minimum row count.
        required: usize,
        /// Rows supplied.
        actual: usize,
    },

    /// The normal equations have no unique solution.
    #[error("Singular system: features are linearly dependent")]
    Singular,

    /// Matrix or vector shapes disagree.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
}

/// A trained model.
pub trait Predictor {
    /// Predicts one value per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DimensionMismatch`] if a row's width differs
    /// from the training matrix.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    /// Relative importance of each feature, summing to 1 (or all zero).
    fn importances(&self) -> Vec<f64>;
}

/// Fits a [`Predictor`] to training data.
pub trait Learner {
    type Model: Predictor;

    /// Trains on feature rows `x` and targets `y`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the data is too small, ragged, or
    /// degenerate.
    fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Self::Model, ModelError>;
}

/// Held-out performance of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub train_rows: usize,
    pub test_rows: usize,
    /// `None` when the test split is empty.
    pub r2: Option<f64>,
    /// `None` when the test split is empty.
    pub mean_absolute_error: Option<f64>,
}

/// Trains on a seeded random split and evaluates on the held-out rows.
///
/// The returned model was fit on the training rows only.
///
/// # Errors
///
/// Returns [`ModelError`] if `x` and `y` differ in length or training or
/// prediction fails.
pub fn train_evaluated<L: Learner>(
    learner: &L,
    x: &[Vec<f64>],
    y: &[f64],
    test_fraction: f64,
    seed: u64,
) -> Result<(L::Model, Evaluation), ModelError> {
    if x.len() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }

    let split = split::train_test_split(x.len(), test_fraction, seed);
    let model = learner.train(&split::select(x, &split.train), &split::select(y, &split.train))?;

    let test_y = split::select(y, &split.test);
    let predicted = model.predict(&split::select(x, &split.test))?;
    let evaluation = Evaluation {
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        r2: metrics::r2_score(&test_y, &predicted),
        mean_absolute_error: metrics::mean_absolute_error(&test_y, &predicted),
    };

    match (evaluation.r2, evaluation.mean_absolute_error) {
        (Some(r2), Some(mae)) => log::info!(
            "Model trained on {} rows: R² on test = {r2:.4}, MAE on test = {mae:.4}",
            evaluation.train_rows
        ),
        _ => log::warn!(
            "Model trained on {} rows with an empty test split; no held-out metrics",
            evaluation.train_rows
        ),
    }

    Ok((model, evaluation))
}
