//! Riskiest/safest county rankings and feature importance ordering.

use std::cmp::Ordering;

use accident_risk_analytics_models::{FeatureImportance, FeatureSet, ScoredCountyRow};

use crate::AnalyticsError;

fn by_rate(a: &ScoredCountyRow, b: &ScoredCountyRow) -> Ordering {
    a.fused
        .accidents_per_1000
        .total_cmp(&b.fused.accidents_per_1000)
        .then_with(|| a.fused.aggregate.state.cmp(&b.fused.aggregate.state))
        .then_with(|| a.fused.aggregate.county.cmp(&b.fused.aggregate.county))
}

/// The `n` counties with the highest accidents per 1000 people.
#[must_use]
pub fn riskiest(rows: &[ScoredCountyRow], n: usize) -> Vec<&ScoredCountyRow> {
    let mut ranked: Vec<&ScoredCountyRow> = rows.iter().collect();
    ranked.sort_by(|a, b| by_rate(b, a));
    ranked.truncate(n);
    ranked
}

/// The `n` counties with the lowest accidents per 1000 people.
#[must_use]
pub fn safest(rows: &[ScoredCountyRow], n: usize) -> Vec<&ScoredCountyRow> {
    let mut ranked: Vec<&ScoredCountyRow> = rows.iter().collect();
    ranked.sort_by(|a, b| by_rate(a, b));
    ranked.truncate(n);
    ranked
}

/// Pairs feature names with importances, most important first.
///
/// # Errors
///
/// Returns [`AnalyticsError::FeatureMismatch`] if the lengths differ.
pub fn rank_importances(
    features: &FeatureSet,
    importances: &[f64],
) -> Result<Vec<FeatureImportance>, AnalyticsError> {
    if features.len() != importances.len() {
        return Err(AnalyticsError::FeatureMismatch {
            expected: features.len(),
            actual: importances.len(),
        });
    }

    let mut ranked: Vec<FeatureImportance> = features
        .columns()
        .iter()
        .zip(importances)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(ranked)
}
