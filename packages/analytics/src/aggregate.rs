//! Collapses incidents into one row per county.

use std::collections::BTreeMap;

use accident_risk_analytics_models::{
    AggregationSpec, CountyAggregate, FeatureSet, GroupKey, Reducer,
};
use accident_risk_geography::normalize::county_key;
use accident_risk_geography_models::CountyKey;
use accident_risk_incident_models::{Incident, IncidentColumn};
use accident_risk_ingest_models::StageLoss;

/// Result of aggregating an incident table.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// One row per distinct group, ordered by normalized `(state, county)`.
    pub rows: Vec<CountyAggregate>,
    /// Feature columns of every row, in order.
    pub features: FeatureSet,
    /// Groups formed versus groups kept after the null-feature filter.
    pub loss: StageLoss,
}

/// Running sum and count for one aggregated column.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    present: u64,
}

impl Accumulator {
    #[allow(clippy::cast_precision_loss)]
    fn reduce(self, reducer: Reducer) -> Option<f64> {
        match reducer {
            Reducer::Count => Some(self.present as f64),
            Reducer::Mean => (self.present > 0).then(|| self.sum / self.present as f64),
        }
    }
}

#[derive(Debug, Clone)]
struct Group {
    /// Names as first seen, kept for display.
    state: String,
    county: String,
    total: u64,
    columns: Vec<Accumulator>,
}

fn group_value(incident: &Incident, spec: &AggregationSpec, key: GroupKey) -> String {
    if spec.group_by().contains(&key) {
        match key {
            GroupKey::State => incident.state.trim().to_string(),
            GroupKey::County => incident.county.trim().to_string(),
        }
    } else {
        String::new()
    }
}

/// Groups `incidents` by the spec's keys and reduces each column.
///
/// Groups are keyed by [`county_key`], so spellings that normalize alike
/// ("Los Angeles", "Los Angeles County", "LOS ANGELES") fall into one row,
/// labelled with the first spelling seen. The identifier count becomes
/// `total_accidents` and skips blank identifiers; every other aggregation
/// becomes a feature, in map order. A key not listed in the spec's
/// `group_by` is left empty in the output. Groups where a mean has no
/// values to average (derived columns that were never computed, for
/// instance) are dropped.
#[must_use]
pub fn aggregate_counties(incidents: &[Incident], spec: &AggregationSpec) -> AggregationOutcome {
    let features = spec.feature_set();
    let aggregations: Vec<_> = spec.feature_aggregations().copied().collect();

    let mut groups: BTreeMap<CountyKey, Group> = BTreeMap::new();
    for incident in incidents {
        let state = group_value(incident, spec, GroupKey::State);
        let county = group_value(incident, spec, GroupKey::County);
        let group = groups
            .entry(county_key(&state, &county))
            .or_insert_with(|| Group {
                state,
                county,
                total: 0,
                columns: vec![Accumulator::default(); aggregations.len()],
            });

        if IncidentColumn::Id.is_present(incident) {
            group.total += 1;
        }
        for (accumulator, aggregation) in group.columns.iter_mut().zip(&aggregations) {
            if !aggregation.column.is_present(incident) {
                continue;
            }
            accumulator.present += 1;
            if let Some(value) = aggregation.column.numeric(incident) {
                accumulator.sum += value;
            }
        }
    }

    let formed = groups.len();
    let rows: Vec<CountyAggregate> = groups
        .into_values()
        .filter_map(|group| {
            let values = group
                .columns
                .iter()
                .zip(&aggregations)
                .map(|(accumulator, aggregation)| accumulator.reduce(aggregation.reducer))
                .collect::<Option<Vec<f64>>>();
            let Some(values) = values else {
                log::debug!(
                    "Dropping {}, {}: a feature has no values",
                    group.county,
                    group.state
                );
                return None;
            };
            Some(CountyAggregate {
                state: group.state,
                county: group.county,
                total_accidents: group.total,
                features: values,
            })
        })
        .collect();

    let loss = StageLoss::new("aggregate", formed, rows.len());
    loss.log();

    AggregationOutcome {
        rows,
        features,
        loss,
    }
}
