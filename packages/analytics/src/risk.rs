//! Bounded risk scores and decade-forward projections.
//!
//! Both transforms are pure functions of a prediction vector supplied by
//! the model. Scores are normalized within one call, so scores from
//! different calls (all years versus a single year, say) are not
//! comparable.

use accident_risk_analytics_models::{FusedCountyRow, ProjectionRow, ScoredCountyRow};

use crate::AnalyticsError;
use crate::fusion::PER_CAPITA_SCALE;

/// Added to the score denominator so equal predictions do not divide by
/// zero.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Upper bound of the risk score range.
pub const MAX_SCORE: f64 = 100.0;

/// Min-max normalizes `predictions` into `[0, 100]`.
///
/// The minimum maps to 0 and the maximum to (just under) 100. When every
/// prediction is equal, every score is 0.
#[must_use]
pub fn bounded_scores(predictions: &[f64]) -> Vec<f64> {
    let min = predictions.iter().copied().fold(f64::INFINITY, f64::min);
    let max = predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min + SCORE_EPSILON;

    predictions
        .iter()
        .map(|p| MAX_SCORE * (p - min) / range)
        .collect()
}

fn check_length(rows: usize, predictions: usize) -> Result<(), AnalyticsError> {
    if rows == predictions {
        Ok(())
    } else {
        Err(AnalyticsError::PredictionLength { rows, predictions })
    }
}

/// Attaches predictions and their bounded scores to `rows`.
///
/// # Errors
///
/// Returns [`AnalyticsError::PredictionLength`] unless there is exactly one
/// prediction per row.
pub fn score_rows(
    rows: &[FusedCountyRow],
    predictions: &[f64],
) -> Result<Vec<ScoredCountyRow>, AnalyticsError> {
    check_length(rows.len(), predictions.len())?;

    let scores = bounded_scores(predictions);
    Ok(rows
        .iter()
        .zip(predictions)
        .zip(scores)
        .map(|((row, &predicted_rate), risk_score)| ScoredCountyRow {
            fused: row.clone(),
            predicted_rate,
            risk_score,
        })
        .collect())
}

/// Forward projection for one county.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub projected_future_population: f64,
    pub predicted_future_total: f64,
    pub accident_growth: f64,
    /// `None` when there are no current accidents to grow from.
    pub accident_growth_pct: Option<f64>,
}

/// Projects accident volume one decade forward.
///
/// Population grows linearly by the last decade's change (clipped at zero)
/// and the predicted per-1000 rate is applied to it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn project(
    people_16_plus: f64,
    decade_population_change: f64,
    total_accidents: u64,
    predicted_future_rate: f64,
) -> Projection {
    let projected_future_population = (people_16_plus + decade_population_change).max(0.0);
    let predicted_future_total = predicted_future_rate * projected_future_population / PER_CAPITA_SCALE;
    let current = total_accidents as f64;
    let accident_growth = predicted_future_total - current;
    let accident_growth_pct = (total_accidents > 0).then(|| accident_growth / current * 100.0);

    Projection {
        projected_future_population,
        predicted_future_total,
        accident_growth,
        accident_growth_pct,
    }
}

/// Projects every scored row using per-row future rate predictions.
///
/// # Errors
///
/// Returns [`AnalyticsError::PredictionLength`] unless there is exactly one
/// future rate per row.
pub fn project_rows(
    rows: &[ScoredCountyRow],
    future_rates: &[f64],
) -> Result<Vec<ProjectionRow>, AnalyticsError> {
    check_length(rows.len(), future_rates.len())?;

    Ok(rows
        .iter()
        .zip(future_rates)
        .map(|(row, &predicted_future_rate)| {
            let fused = &row.fused;
            let projection = project(
                fused.people_16_plus,
                fused.decade_population_change,
                fused.aggregate.total_accidents,
                predicted_future_rate,
            );
            ProjectionRow {
                scored: row.clone(),
                projected_future_population: projection.projected_future_population,
                predicted_future_rate,
                predicted_future_total: projection.predicted_future_total,
                accident_growth: projection.accident_growth,
                accident_growth_pct: projection.accident_growth_pct,
            }
        })
        .collect())
}
