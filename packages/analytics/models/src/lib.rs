#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County-level analytics types.
//!
//! Describes how incidents are reduced to one row per county
//! ([`AggregationSpec`]), the ordered model feature contract
//! ([`FeatureSet`]), and the row types produced as a county moves through
//! aggregation, fusion with population data, scoring and projection.

use accident_risk_geography_models::StateLabeled;
use accident_risk_incident_models::IncidentColumn;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Name of the population feature appended to the aggregated features.
pub const POPULATION_FEATURE: &str = "People16Plus";

/// How a column is reduced within a group.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Reducer {
    /// Number of rows with a value.
    Count,
    /// Arithmetic mean.
    Mean,
}

/// A column incidents can be grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum GroupKey {
    State,
    County,
}

/// One `column → reducer` entry of an aggregation map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub column: IncidentColumn,
    pub reducer: Reducer,
}

/// Grouping keys plus an ordered aggregation map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSpec {
    group_by: Vec<GroupKey>,
    aggregations: Vec<Aggregation>,
}

impl AggregationSpec {
    /// Builds a spec, forcing the identifier column's reducer to
    /// [`Reducer::Count`].
    ///
    /// A column listed more than once keeps its first position and its last
    /// reducer, the way a map literal with a repeated key behaves.
    #[must_use]
    pub fn new(group_by: Vec<GroupKey>, aggregations: &[Aggregation]) -> Self {
        let mut deduped: Vec<Aggregation> = Vec::with_capacity(aggregations.len());
        for aggregation in aggregations {
            let reducer = if aggregation.column == IncidentColumn::Id {
                Reducer::Count
            } else {
                aggregation.reducer
            };
            if let Some(existing) = deduped.iter_mut().find(|a| a.column == aggregation.column) {
                existing.reducer = reducer;
            } else {
                deduped.push(Aggregation {
                    column: aggregation.column,
                    reducer,
                });
            }
        }

        Self {
            group_by,
            aggregations: deduped,
        }
    }

    /// The standard county aggregation: incident count plus the mean of
    /// every weather, road and behavioral attribute.
    #[must_use]
    pub fn county_default() -> Self {
        let mean = |column| Aggregation {
            column,
            reducer: Reducer::Mean,
        };
        Self::new(
            vec![GroupKey::State, GroupKey::County],
            &[
                Aggregation {
                    column: IncidentColumn::Id,
                    reducer: Reducer::Count,
                },
                mean(IncidentColumn::Severity),
                mean(IncidentColumn::Distance),
                mean(IncidentColumn::Temperature),
                mean(IncidentColumn::Visibility),
                mean(IncidentColumn::Precipitation),
                mean(IncidentColumn::IsNight),
                mean(IncidentColumn::IsWeekend),
            ],
        )
    }

    #[must_use]
    pub fn group_by(&self) -> &[GroupKey] {
        &self.group_by
    }

    #[must_use]
    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    /// Aggregations that become model features, in map order.
    ///
    /// Everything except the identifier count, which becomes
    /// `TotalAccidents`.
    pub fn feature_aggregations(&self) -> impl Iterator<Item = &Aggregation> {
        self.aggregations
            .iter()
            .filter(|a| a.column != IncidentColumn::Id)
    }

    /// The ordered feature columns this spec produces.
    #[must_use]
    pub fn feature_set(&self) -> FeatureSet {
        FeatureSet::new(
            self.feature_aggregations()
                .map(|a| a.column.to_string())
                .collect(),
        )
    }
}

impl Default for AggregationSpec {
    fn default() -> Self {
        Self::county_default()
    }
}

/// Ordered list of model feature names.
///
/// Threaded unchanged from aggregation to training and inference so the
/// column order cannot drift between them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of `name` in the set.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|c| c == name)
    }

    /// The aggregated features followed by [`POPULATION_FEATURE`], the
    /// column list the model is trained on.
    #[must_use]
    pub fn with_population(&self) -> Self {
        let mut columns = self.0.clone();
        columns.push(POPULATION_FEATURE.to_string());
        Self(columns)
    }
}

/// One `(state, county)` group after aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyAggregate {
    pub state: String,
    pub county: String,
    /// Count of incidents in the group.
    pub total_accidents: u64,
    /// Reduced feature values, aligned with the spec's [`FeatureSet`].
    pub features: Vec<f64>,
}

impl StateLabeled for CountyAggregate {
    fn state(&self) -> &str {
        &self.state
    }

    fn set_state(&mut self, state: String) {
        self.state = state;
    }
}

/// A county aggregate joined with its population record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedCountyRow {
    pub aggregate: CountyAggregate,
    /// Driving-age population (18+ bracket sum).
    pub people_16_plus: f64,
    pub decade_population_change: f64,
    /// `total_accidents / people_16_plus * 1000`.
    pub accidents_per_1000: f64,
}

impl FusedCountyRow {
    /// Linear projection one decade forward, clipped at zero.
    #[must_use]
    pub fn projected_population(&self) -> f64 {
        (self.people_16_plus + self.decade_population_change).max(0.0)
    }
}

/// A fused row with its model prediction and bounded risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCountyRow {
    pub fused: FusedCountyRow,
    /// Predicted accidents per 1000 people.
    pub predicted_rate: f64,
    /// Min-max normalized prediction, in `[0, 100]` within its batch.
    pub risk_score: f64,
}

/// A scored row extended with its decade-forward projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub scored: ScoredCountyRow,
    pub projected_future_population: f64,
    /// Model output on the projected feature row.
    pub predicted_future_rate: f64,
    pub predicted_future_total: f64,
    pub accident_growth: f64,
    /// `None` when the county has no current accidents.
    pub accident_growth_pct: Option<f64>,
}

/// Per-county row handed to the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RiskRow {
    pub state: String,
    pub county: String,
    /// Two-digit state FIPS code, empty when the state is unknown.
    pub state_fips: String,
    /// False for Alaska, Hawaii and Puerto Rico.
    pub continental: bool,
    pub total_accidents: u64,
    #[serde(rename = "People16Plus")]
    pub people_16_plus: f64,
    #[serde(rename = "AccidentsPer1000")]
    pub accidents_per_1000: f64,
    pub risk_score: f64,
}

/// [`RiskRow`] plus the projection columns.
///
/// Flat rather than nested so it serializes to a single CSV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectionRiskRow {
    pub state: String,
    pub county: String,
    pub state_fips: String,
    pub continental: bool,
    pub total_accidents: u64,
    #[serde(rename = "People16Plus")]
    pub people_16_plus: f64,
    #[serde(rename = "AccidentsPer1000")]
    pub accidents_per_1000: f64,
    pub risk_score: f64,
    pub projected_future_population: f64,
    pub predicted_future_rate: f64,
    pub predicted_future_total: f64,
    pub accident_growth: f64,
    pub accident_growth_pct: Option<f64>,
}

/// A model feature and its share of total importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}
