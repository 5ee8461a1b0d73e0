//! Flattens scored rows into the tables handed to the map renderer.
//!
//! The renderer matches county boundary files by state FIPS code, and
//! draws a contiguous-US view, so each row carries both.

use accident_risk_analytics_models::{ProjectionRiskRow, ProjectionRow, RiskRow, ScoredCountyRow};
use accident_risk_geography_models::fips;

/// Resolves a full state name to its FIPS code and contiguous-US flag.
///
/// Unknown states get an empty code and count as continental.
fn state_location(state: &str) -> (String, bool) {
    let code = fips::fips_for_name(state);
    (
        code.unwrap_or_default().to_string(),
        code.is_none_or(fips::is_contiguous),
    )
}

/// One renderer row per scored county.
#[must_use]
pub fn risk_rows(rows: &[ScoredCountyRow]) -> Vec<RiskRow> {
    rows.iter()
        .map(|row| {
            let aggregate = &row.fused.aggregate;
            let (state_fips, continental) = state_location(&aggregate.state);
            RiskRow {
                state: aggregate.state.clone(),
                county: aggregate.county.clone(),
                state_fips,
                continental,
                total_accidents: aggregate.total_accidents,
                people_16_plus: row.fused.people_16_plus,
                accidents_per_1000: row.fused.accidents_per_1000,
                risk_score: row.risk_score,
            }
        })
        .collect()
}

/// One renderer row per projected county, with the projection columns.
#[must_use]
pub fn projection_risk_rows(rows: &[ProjectionRow]) -> Vec<ProjectionRiskRow> {
    rows.iter()
        .map(|row| {
            let aggregate = &row.scored.fused.aggregate;
            let (state_fips, continental) = state_location(&aggregate.state);
            ProjectionRiskRow {
                state: aggregate.state.clone(),
                county: aggregate.county.clone(),
                state_fips,
                continental,
                total_accidents: aggregate.total_accidents,
                people_16_plus: row.scored.fused.people_16_plus,
                accidents_per_1000: row.scored.fused.accidents_per_1000,
                risk_score: row.scored.risk_score,
                projected_future_population: row.projected_future_population,
                predicted_future_rate: row.predicted_future_rate,
                predicted_future_total: row.predicted_future_total,
                accident_growth: row.accident_growth,
                accident_growth_pct: row.accident_growth_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use accident_risk_analytics_models::{CountyAggregate, FusedCountyRow};

    use super::*;

    fn scored(state: &str) -> ScoredCountyRow {
        ScoredCountyRow {
            fused: FusedCountyRow {
                aggregate: CountyAggregate {
                    state: state.to_string(),
                    county: "Somewhere".to_string(),
                    total_accidents: 4,
                    features: vec![1.0],
                },
                people_16_plus: 2000.0,
                decade_population_change: 0.0,
                accidents_per_1000: 2.0,
            },
            predicted_rate: 2.5,
            risk_score: 42.0,
        }
    }

    #[test]
    fn resolves_fips_and_continental_flag() {
        let rows = risk_rows(&[scored("Ohio"), scored("Alaska"), scored("Atlantis")]);
        assert_eq!(rows[0].state_fips, "39");
        assert!(rows[0].continental);
        assert_eq!(rows[1].state_fips, "02");
        assert!(!rows[1].continental);
        assert_eq!(rows[2].state_fips, "");
        assert!(rows[2].continental);
    }

    #[test]
    fn projection_rows_carry_scores() {
        let projection = ProjectionRow {
            scored: scored("Hawaii"),
            projected_future_population: 2100.0,
            predicted_future_rate: 2.5,
            predicted_future_total: 5.25,
            accident_growth: 1.25,
            accident_growth_pct: Some(31.25),
        };
        let rows = projection_risk_rows(&[projection]);
        assert_eq!(rows[0].state_fips, "15");
        assert!(!rows[0].continental);
        assert!((rows[0].risk_score - 42.0).abs() < f64::EPSILON);
        assert_eq!(rows[0].accident_growth_pct, Some(31.25));
    }
}
