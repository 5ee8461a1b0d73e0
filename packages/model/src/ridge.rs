//! Ridge regression on standardized features.
//!
//! Features are centered and scaled to unit variance before fitting, so the
//! L2 penalty treats every column alike and coefficient magnitudes are
//! comparable. The normal equations are solved in closed form, which makes
//! training deterministic.

use nalgebra::{DMatrix, DVector};

use crate::{Learner, ModelError, Predictor};

/// Singular values below this share of the largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Minimum rows needed to estimate a mean and a spread.
const MIN_ROWS: usize = 2;

/// Ridge regression learner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeRegression {
    /// L2 penalty strength. Zero gives ordinary least squares.
    pub l2: f64,
}

impl RidgeRegression {
    #[must_use]
    pub const fn new(l2: f64) -> Self {
        Self { l2 }
    }
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A fitted ridge model.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeModel {
    intercept: f64,
    means: DVector<f64>,
    scales: DVector<f64>,
    /// Coefficients on the standardized features.
    coefficients: DVector<f64>,
}

impl RidgeModel {
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice()
    }
}

/// Copies rows into a matrix after checking they all have `width` columns.
fn to_matrix(x: &[Vec<f64>], width: usize) -> Result<DMatrix<f64>, ModelError> {
    if let Some(row) = x.iter().find(|row| row.len() != width) {
        return Err(ModelError::DimensionMismatch {
            expected: width,
            actual: row.len(),
        });
    }
    Ok(DMatrix::from_fn(x.len(), width, |i, j| x[i][j]))
}

fn standardize(x: &DMatrix<f64>, means: &DVector<f64>, scales: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| (x[(i, j)] - means[j]) / scales[j])
}

/// Per-column means and standard deviations. Constant columns get a scale
/// of 1 and stay at zero after centering.
fn column_stats(x: &DMatrix<f64>) -> (DVector<f64>, DVector<f64>) {
    let means = DVector::from_iterator(x.ncols(), x.column_iter().map(|c| c.mean()));
    let scales = DVector::from_iterator(
        x.ncols(),
        x.column_iter().map(|c| {
            let spread = c.variance().sqrt();
            if spread > RANK_TOLERANCE { spread } else { 1.0 }
        }),
    );
    (means, scales)
}

/// Solves the normal equations, rejecting rank-deficient systems.
fn solve(gram: DMatrix<f64>, moment: &DVector<f64>) -> Result<DVector<f64>, ModelError> {
    if gram.is_empty() {
        return Ok(DVector::zeros(0));
    }
    let width = gram.ncols();
    let svd = gram.svd(true, true);
    let eps = RANK_TOLERANCE * svd.singular_values.max();
    if svd.rank(eps) < width {
        return Err(ModelError::Singular);
    }
    svd.solve(moment, eps).map_err(|_| ModelError::Singular)
}

impl Learner for RidgeRegression {
    type Model = RidgeModel;

    fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<RidgeModel, ModelError> {
        if x.len() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        if x.len() < MIN_ROWS {
            return Err(ModelError::InsufficientData {
                required: MIN_ROWS,
                actual: x.len(),
            });
        }

        let x = to_matrix(x, x[0].len())?;
        let (means, scales) = column_stats(&x);
        let z = standardize(&x, &means, &scales);

        let y = DVector::from_column_slice(y);
        let intercept = y.mean();

        // (ZᵀZ + λI) β = Zᵀ(y - ȳ)
        let gram = z.tr_mul(&z) + DMatrix::identity(z.ncols(), z.ncols()) * self.l2;
        let moment = z.tr_mul(&y.add_scalar(-intercept));

        let coefficients = solve(gram, &moment)?;
        log::debug!(
            "Ridge fit: intercept {intercept:.4}, coefficients {:?}",
            coefficients.as_slice()
        );

        Ok(RidgeModel {
            intercept,
            means,
            scales,
            coefficients,
        })
    }
}

impl Predictor for RidgeModel {
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let x = to_matrix(x, self.coefficients.len())?;
        let z = standardize(&x, &self.means, &self.scales);
        Ok((z * &self.coefficients)
            .add_scalar(self.intercept)
            .iter()
            .copied()
            .collect())
    }

    /// Absolute standardized coefficients, normalized to sum to 1.
    fn importances(&self) -> Vec<f64> {
        let total: f64 = self.coefficients.iter().map(|c| c.abs()).sum();
        if total <= 0.0 {
            return vec![0.0; self.coefficients.len()];
        }
        self.coefficients.iter().map(|c| c.abs() / total).collect()
    }
}
