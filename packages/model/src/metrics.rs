//! Regression metrics.

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Coefficient of determination.
///
/// Returns `None` for empty or mismatched inputs. With constant targets,
/// a perfect prediction scores 1 and anything else scores 0.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }

    let mean = mean(actual);
    let residual: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let total: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if total == 0.0 {
        return Some(if residual == 0.0 { 1.0 } else { 0.0 });
    }
    Some(1.0 - residual / total)
}

/// Mean absolute error. Returns `None` for empty or mismatched inputs.
#[must_use]
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }

    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .collect();
    Some(mean(&errors))
}
