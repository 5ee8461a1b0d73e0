//! Model input matrices built from fused rows.
//!
//! Every matrix uses the same column order: the aggregated features of the
//! [`FeatureSet`], then the population column. Pass the set returned by
//! [`FeatureSet::with_population`].

use accident_risk_analytics_models::{FeatureSet, FusedCountyRow, POPULATION_FEATURE};

use crate::AnalyticsError;

fn check_feature_set(features: &FeatureSet) -> Result<usize, AnalyticsError> {
    if features.columns().last().map(String::as_str) != Some(POPULATION_FEATURE) {
        return Err(AnalyticsError::FeatureMismatch {
            expected: features.len() + 1,
            actual: features.len(),
        });
    }
    Ok(features.len() - 1)
}

fn build(
    rows: &[FusedCountyRow],
    features: &FeatureSet,
    population: impl Fn(&FusedCountyRow) -> f64,
) -> Result<Vec<Vec<f64>>, AnalyticsError> {
    let aggregated = check_feature_set(features)?;

    rows.iter()
        .map(|row| {
            if row.aggregate.features.len() != aggregated {
                return Err(AnalyticsError::FeatureMismatch {
                    expected: aggregated,
                    actual: row.aggregate.features.len(),
                });
            }
            let mut values = Vec::with_capacity(features.len());
            values.extend_from_slice(&row.aggregate.features);
            values.push(population(row));
            Ok(values)
        })
        .collect()
}

/// One feature row per county, using current population.
///
/// # Errors
///
/// Returns [`AnalyticsError::FeatureMismatch`] if `features` does not end
/// with the population column or a row's feature count disagrees with it.
pub fn feature_matrix(
    rows: &[FusedCountyRow],
    features: &FeatureSet,
) -> Result<Vec<Vec<f64>>, AnalyticsError> {
    build(rows, features, |row| row.people_16_plus)
}

/// Like [`feature_matrix`], with the population column replaced by the
/// decade-forward projected population.
///
/// # Errors
///
/// Same as [`feature_matrix`].
pub fn projected_feature_matrix(
    rows: &[FusedCountyRow],
    features: &FeatureSet,
) -> Result<Vec<Vec<f64>>, AnalyticsError> {
    build(rows, features, FusedCountyRow::projected_population)
}

/// The training target: accidents per 1000 people.
#[must_use]
pub fn rate_targets(rows: &[FusedCountyRow]) -> Vec<f64> {
    rows.iter().map(|row| row.accidents_per_1000).collect()
}

#[cfg(test)]
mod tests {
    use accident_risk_analytics_models::CountyAggregate;

    use super::*;

    fn row(features: Vec<f64>, people: f64, change: f64) -> FusedCountyRow {
        FusedCountyRow {
            aggregate: CountyAggregate {
                state: "Ohio".to_string(),
                county: "Adams".to_string(),
                total_accidents: 5,
                features,
            },
            people_16_plus: people,
            decade_population_change: change,
            accidents_per_1000: 5.0 / people * 1000.0,
        }
    }

    fn features() -> FeatureSet {
        FeatureSet::new(vec!["Severity".to_string(), "Is_Night".to_string()]).with_population()
    }

    #[test]
    fn population_is_last_column() {
        let matrix = feature_matrix(&[row(vec![2.0, 0.5], 800.0, 40.0)], &features()).unwrap();
        assert_eq!(matrix, vec![vec![2.0, 0.5, 800.0]]);
    }

    #[test]
    fn projected_matrix_swaps_population_only() {
        let rows = [row(vec![2.0, 0.5], 800.0, -900.0)];
        let matrix = projected_feature_matrix(&rows, &features()).unwrap();
        assert_eq!(matrix, vec![vec![2.0, 0.5, 0.0]]);
    }

    #[test]
    fn rejects_row_with_wrong_width() {
        let err = feature_matrix(&[row(vec![2.0], 800.0, 0.0)], &features()).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::FeatureMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn rejects_set_without_population() {
        let bare = FeatureSet::new(vec!["Severity".to_string()]);
        assert!(feature_matrix(&[row(vec![2.0], 800.0, 0.0)], &bare).is_err());
    }

    #[test]
    fn targets_are_per_capita_rates() {
        let targets = rate_targets(&[row(vec![1.0, 0.0], 500.0, 0.0)]);
        assert!((targets[0] - 10.0).abs() < 1e-9);
    }
}
