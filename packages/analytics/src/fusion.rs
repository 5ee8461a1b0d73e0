//! Joins county aggregates with the population table.
//!
//! The join is a left join followed by a filter: every aggregate first
//! gets an optional population match, and only then are the unmatched
//! rows removed. Unmatched counties are returned so a run can report
//! which counties fell out.

use std::collections::BTreeMap;

use accident_risk_analytics_models::{CountyAggregate, FusedCountyRow};
use accident_risk_geography::normalize::county_key;
use accident_risk_geography_models::{CountyKey, PopulationRecord};
use accident_risk_ingest_models::StageLoss;

/// Accidents per this many people.
pub const PER_CAPITA_SCALE: f64 = 1000.0;

/// Population fields matched to one aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationMatch {
    pub people_16_plus: f64,
    pub decade_population_change: f64,
}

/// Result of fusing aggregates with population data.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub rows: Vec<FusedCountyRow>,
    /// Keys of aggregates that found no population record.
    pub unmatched: Vec<CountyKey>,
    pub loss: StageLoss,
}

/// Indexes population records by normalized county key.
///
/// Records that normalize to the same key are summed.
fn population_index(population: &[PopulationRecord]) -> BTreeMap<CountyKey, PopulationMatch> {
    let mut index: BTreeMap<CountyKey, PopulationMatch> = BTreeMap::new();
    for record in population {
        let entry = index
            .entry(county_key(&record.state, &record.county))
            .or_insert(PopulationMatch {
                people_16_plus: 0.0,
                decade_population_change: 0.0,
            });
        entry.people_16_plus += record.people_16_plus;
        entry.decade_population_change += record.decade_population_change;
    }
    index
}

/// Pairs each aggregate with its population match, if any.
///
/// Every aggregate appears exactly once, in input order.
#[must_use]
pub fn left_join(
    aggregates: &[CountyAggregate],
    population: &[PopulationRecord],
) -> Vec<(CountyAggregate, Option<PopulationMatch>)> {
    let index = population_index(population);
    aggregates
        .iter()
        .map(|aggregate| {
            let key = county_key(&aggregate.state, &aggregate.county);
            (aggregate.clone(), index.get(&key).copied())
        })
        .collect()
}

/// Accidents per [`PER_CAPITA_SCALE`] people.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accidents_per_1000(total_accidents: u64, people_16_plus: f64) -> f64 {
    total_accidents as f64 / people_16_plus * PER_CAPITA_SCALE
}

/// Joins aggregates with population records and keeps only the rows that
/// have a usable population.
#[must_use]
pub fn fuse(aggregates: &[CountyAggregate], population: &[PopulationRecord]) -> FusionOutcome {
    let joined = left_join(aggregates, population);

    let mut rows = Vec::with_capacity(joined.len());
    let mut unmatched = Vec::new();
    for (aggregate, matched) in joined {
        match matched {
            Some(population) if population.people_16_plus > 0.0 => {
                rows.push(FusedCountyRow {
                    accidents_per_1000: accidents_per_1000(
                        aggregate.total_accidents,
                        population.people_16_plus,
                    ),
                    people_16_plus: population.people_16_plus,
                    decade_population_change: population.decade_population_change,
                    aggregate,
                });
            }
            _ => {
                let key = county_key(&aggregate.state, &aggregate.county);
                log::debug!("No population match for {key}");
                unmatched.push(key);
            }
        }
    }

    let loss = StageLoss::new("fusion", aggregates.len(), rows.len());
    loss.log();
    if !unmatched.is_empty() {
        log::info!("{} counties had no population match", unmatched.len());
    }

    FusionOutcome {
        rows,
        unmatched,
        loss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(state: &str, county: &str, total: u64) -> CountyAggregate {
        CountyAggregate {
            state: state.to_string(),
            county: county.to_string(),
            total_accidents: total,
            features: vec![2.0],
        }
    }

    fn record(state: &str, county: &str, people: f64, change: f64) -> PopulationRecord {
        PopulationRecord {
            state: state.to_string(),
            county: county.to_string(),
            people_16_plus: people,
            decade_population_change: change,
        }
    }

    #[test]
    fn unmatched_aggregate_is_absent_from_output() {
        let aggregates = vec![
            aggregate("California", "Los Angeles", 50),
            aggregate("California", "Nowhere", 7),
        ];
        let population = vec![record("California", "Los Angeles County", 10_000.0, 250.0)];

        let outcome = fuse(&aggregates, &population);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].aggregate.county, "Los Angeles");
        assert!(
            outcome
                .rows
                .iter()
                .all(|r| r.aggregate.county != "Nowhere")
        );
        assert_eq!(
            outcome.unmatched,
            vec![CountyKey {
                state: "CALIFORNIA".to_string(),
                county: "NOWHERE".to_string(),
            }]
        );
        assert_eq!(outcome.loss.dropped(), 1);
    }

    #[test]
    fn left_join_keeps_every_aggregate() {
        let aggregates = vec![aggregate("Ohio", "Adams", 1), aggregate("Ohio", "Allen", 2)];
        let population = vec![record("Ohio", "Allen", 100.0, 0.0)];
        let joined = left_join(&aggregates, &population);
        assert_eq!(joined.len(), 2);
        assert!(joined[0].1.is_none());
        assert!(joined[1].1.is_some());
    }

    #[test]
    fn per_capita_rate_is_per_thousand() {
        let outcome = fuse(
            &[aggregate("Texas", "Travis", 30)],
            &[record("Texas", "Travis", 1500.0, -100.0)],
        );
        let row = &outcome.rows[0];
        assert!((row.accidents_per_1000 - 20.0).abs() < 1e-9);
        assert!((row.decade_population_change + 100.0).abs() < 1e-9);
        assert!((row.projected_population() - 1400.0).abs() < 1e-9);
    }

    #[test]
    fn colliding_population_keys_are_summed() {
        let population = vec![
            record("Virginia", "Fairfax", 900.0, 10.0),
            record("VIRGINIA", "Fairfax County", 100.0, 5.0),
        ];
        let outcome = fuse(&[aggregate("Virginia", "Fairfax", 10)], &population);
        assert!((outcome.rows[0].people_16_plus - 1000.0).abs() < 1e-9);
        assert!((outcome.rows[0].decade_population_change - 15.0).abs() < 1e-9);
    }

    #[test]
    fn no_population_data_drops_everything() {
        let outcome = fuse(&[aggregate("Ohio", "Adams", 1)], &[]);
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.unmatched.len(), 1);
    }
}
