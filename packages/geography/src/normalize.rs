//! State and county name normalization.
//!
//! State normalization is a single decision per table: the first non-empty
//! state value is sampled, and if it looks like a two-letter code every
//! value is mapped to its full name. County keys are normalized at join
//! time by trimming, stripping a trailing `" County"` and uppercasing.
//! Punctuation is left alone, so `"St. Louis"` and `"St Louis"` are
//! different counties.

use accident_risk_geography_models::{CountyKey, StateFormat, StateLabeled, StateSniff, fips};

/// Literal suffix removed from county names before comparison.
const COUNTY_SUFFIX: &str = " County";

/// Length of a postal state abbreviation.
const ABBREVIATION_LEN: usize = 2;

/// Samples the first non-empty state value to decide how the table writes
/// states.
#[must_use]
pub fn sniff_state_format<T: StateLabeled>(rows: &[T]) -> StateSniff {
    let Some(sample) = rows
        .iter()
        .map(|row| row.state().trim())
        .find(|s| !s.is_empty())
    else {
        return StateSniff::Unresolved;
    };

    if sample.chars().count() == ABBREVIATION_LEN {
        StateSniff::Detected(StateFormat::Abbreviated)
    } else {
        StateSniff::Detected(StateFormat::FullName)
    }
}

/// Maps a two-letter code to its full state name, passing unknown values
/// through unchanged.
#[must_use]
pub fn expand_state(value: &str) -> String {
    fips::full_name(value.trim()).map_or_else(|| value.to_string(), str::to_string)
}

/// Returns a copy of `rows` with abbreviated states expanded to full names.
///
/// The format is sniffed once for the whole table. Tables already in
/// full-name form are returned unchanged, which makes the operation
/// idempotent.
#[must_use]
pub fn normalize_states<T: StateLabeled + Clone>(rows: &[T]) -> (Vec<T>, StateSniff) {
    let sniff = sniff_state_format(rows);

    let normalized = match sniff {
        StateSniff::Detected(StateFormat::Abbreviated) => {
            let converted: Vec<T> = rows
                .iter()
                .map(|row| {
                    let mut row = row.clone();
                    let full = expand_state(row.state());
                    row.set_state(full);
                    row
                })
                .collect();
            log::info!("Converted state abbreviations to full names");
            converted
        }
        StateSniff::Detected(StateFormat::FullName) => {
            log::info!("State names are already in full form");
            rows.to_vec()
        }
        StateSniff::Unresolved => {
            log::warn!("No state values to sample; leaving states unchanged");
            rows.to_vec()
        }
    };

    (normalized, sniff)
}

/// Normalizes a county name for comparison.
///
/// Trims, strips a trailing `" County"` (case-sensitive), and uppercases.
#[must_use]
pub fn normalize_county(county: &str) -> String {
    let trimmed = county.trim();
    trimmed
        .strip_suffix(COUNTY_SUFFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_uppercase()
}

/// Builds the join key for a `(state, county)` pair.
#[must_use]
pub fn county_key(state: &str, county: &str) -> CountyKey {
    CountyKey {
        state: state.trim().to_uppercase(),
        county: normalize_county(county),
    }
}

#[cfg(test)]
mod tests {
    use accident_risk_geography_models::PopulationRecord;

    use super::*;

    fn record(state: &str) -> PopulationRecord {
        PopulationRecord {
            state: state.to_string(),
            county: "Somewhere".to_string(),
            people_16_plus: 100.0,
            decade_population_change: 0.0,
        }
    }

    fn states(rows: &[PopulationRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.state.as_str()).collect()
    }

    #[test]
    fn expands_abbreviated_table() {
        let rows = vec![record("CA"), record("DC"), record("ZZ")];
        let (normalized, sniff) = normalize_states(&rows);
        assert_eq!(sniff, StateSniff::Detected(StateFormat::Abbreviated));
        assert_eq!(
            states(&normalized),
            vec!["California", "District of Columbia", "ZZ"]
        );
        assert_eq!(states(&rows), vec!["CA", "DC", "ZZ"]);
    }

    #[test]
    fn leaves_full_name_table_alone() {
        let rows = vec![record("Ohio"), record("TX")];
        let (normalized, sniff) = normalize_states(&rows);
        assert_eq!(sniff, StateSniff::Detected(StateFormat::FullName));
        // The decision is global: the minority abbreviation is not expanded.
        assert_eq!(states(&normalized), vec!["Ohio", "TX"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let rows = vec![record("NY"), record("NJ")];
        let (once, _) = normalize_states(&rows);
        let (twice, sniff) = normalize_states(&once);
        assert_eq!(once, twice);
        assert_eq!(sniff, StateSniff::Detected(StateFormat::FullName));
    }

    #[test]
    fn samples_first_non_empty_value() {
        let rows = vec![record(""), record("  "), record("WA")];
        assert_eq!(
            sniff_state_format(&rows),
            StateSniff::Detected(StateFormat::Abbreviated)
        );
        assert_eq!(
            sniff_state_format::<PopulationRecord>(&[]),
            StateSniff::Unresolved
        );
    }

    #[test]
    fn works_on_incident_rows() {
        use accident_risk_incident_models::Incident;
        use chrono::NaiveDate;

        let at = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let incident = Incident {
            id: "A-1".to_string(),
            start_time: at,
            end_time: at,
            severity: 2.0,
            distance_mi: 0.0,
            temperature_f: 50.0,
            visibility_mi: 10.0,
            precipitation_in: 0.0,
            county: "Harris".to_string(),
            state: "TX".to_string(),
            start_lat: 29.7,
            start_lng: -95.3,
            time_features: None,
        };
        let (normalized, _) = normalize_states(&[incident]);
        assert_eq!(normalized[0].state, "Texas");
    }

    #[test]
    fn county_suffix_and_case_are_ignored() {
        assert_eq!(
            county_key("California", "Los Angeles County"),
            county_key(" CALIFORNIA ", "LOS ANGELES")
        );
    }

    #[test]
    fn punctuation_is_significant() {
        assert_ne!(
            county_key("Missouri", "St. Louis"),
            county_key("Missouri", "St Louis")
        );
    }

    #[test]
    fn suffix_match_is_case_sensitive_and_trailing_only() {
        assert_eq!(normalize_county("Dallas COUNTY"), "DALLAS COUNTY");
        assert_eq!(normalize_county("County Line"), "COUNTY LINE");
        assert_eq!(normalize_county("  Cook County  "), "COOK");
    }
}
