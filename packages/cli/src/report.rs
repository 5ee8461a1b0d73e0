//! Plain-text reports printed to stdout.

use accident_risk_analytics_models::{FeatureImportance, ScoredCountyRow};
use accident_risk_geography_models::PopulationRecord;

/// Summary statistics of the driving-age population column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Describes `People16Plus` across `records`. `None` when empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn describe_population(records: &[PopulationRecord]) -> Option<PopulationStats> {
    if records.is_empty() {
        return None;
    }
    let values = records.iter().map(|r| r.people_16_plus);
    Some(PopulationStats {
        count: records.len(),
        mean: values.clone().sum::<f64>() / records.len() as f64,
        min: values.clone().fold(f64::INFINITY, f64::min),
        max: values.fold(f64::NEG_INFINITY, f64::max),
    })
}

/// One ranking table line for `row`.
#[must_use]
pub fn ranking_line(row: &ScoredCountyRow) -> String {
    let fused = &row.fused;
    format!(
        "{:<20} {:<28} {:>10} {:>12.0} {:>10.3} {:>8.2}",
        fused.aggregate.state,
        fused.aggregate.county,
        fused.aggregate.total_accidents,
        fused.people_16_plus,
        fused.accidents_per_1000,
        row.risk_score
    )
}

/// Prints a ranking table of scored counties.
pub fn print_ranking(title: &str, rows: &[&ScoredCountyRow]) {
    println!("{title}");
    println!(
        "{:<20} {:<28} {:>10} {:>12} {:>10} {:>8}",
        "STATE", "COUNTY", "ACCIDENTS", "PEOPLE 16+", "PER 1000", "SCORE"
    );
    println!("{}", "-".repeat(93));
    for row in rows {
        println!("{}", ranking_line(row));
    }
}

/// Prints feature importances, one per line.
pub fn print_importances(importances: &[FeatureImportance]) {
    println!("Feature importances");
    for entry in importances {
        println!("  {:<20} {:.4}", entry.feature, entry.importance);
    }
}

/// Prints population statistics.
pub fn print_population(stats: Option<&PopulationStats>) {
    let Some(s) = stats else {
        println!("No counties with population data.");
        return;
    };
    println!("People16Plus");
    println!("  count {}", s.count);
    println!("  mean  {:.1}", s.mean);
    println!("  min   {:.0}", s.min);
    println!("  max   {:.0}", s.max);
}

#[cfg(test)]
mod tests {
    use accident_risk_analytics_models::{CountyAggregate, FusedCountyRow};

    use super::*;

    fn record(county: &str, people: f64) -> PopulationRecord {
        PopulationRecord {
            state: "Ohio".to_string(),
            county: county.to_string(),
            people_16_plus: people,
            decade_population_change: 0.0,
        }
    }

    #[test]
    fn describes_population() {
        let stats = describe_population(&[
            record("Adams", 100.0),
            record("Allen", 300.0),
            record("Clark", 800.0),
        ])
        .unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 400.0).abs() < 1e-9);
        assert!((stats.min - 100.0).abs() < f64::EPSILON);
        assert!((stats.max - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_population_has_no_stats() {
        assert_eq!(describe_population(&[]), None);
    }

    #[test]
    fn ranking_line_aligns_columns() {
        let row = ScoredCountyRow {
            fused: FusedCountyRow {
                aggregate: CountyAggregate {
                    state: "Ohio".to_string(),
                    county: "Adams".to_string(),
                    total_accidents: 3,
                    features: vec![],
                },
                people_16_plus: 1000.0,
                decade_population_change: 0.0,
                accidents_per_1000: 3.0,
            },
            predicted_rate: 2.5,
            risk_score: 50.0,
        };
        let line = ranking_line(&row);
        assert_eq!(line.len(), 93);
        assert!(line.starts_with("Ohio "));
        assert_eq!(&line[21..26], "Adams");
        assert!(line.ends_with("   50.00"));
    }
}
