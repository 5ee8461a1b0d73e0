//! Record cleaner.
//!
//! Promotes [`RawIncident`] rows to validated [`Incident`]s by applying
//! three conjunctive filters in sequence:
//!
//! 1. **geo-required**: county, state, start latitude and start longitude
//!    must be present (coordinates must also be numeric).
//! 2. **time-valid**: start and end timestamps must both parse.
//! 3. **numeric-valid**: severity, distance, temperature, visibility and
//!    precipitation must all coerce to numbers.
//!
//! Malformed rows are expected at scale, so a failed coercion drops the
//! row rather than failing the load. Each filter's loss is counted in the
//! returned [`CleaningReport`].

use accident_risk_incident_models::{Incident, RawIncident};
use accident_risk_ingest_models::{CleaningReport, StageLoss};
use chrono::NaiveDateTime;

use crate::parsing::{parse_optional_number, parse_timestamp};

/// A row that passed the geo-required filter.
struct Located<'a> {
    raw: &'a RawIncident,
    county: &'a str,
    state: &'a str,
    start_lat: f64,
    start_lng: f64,
}

/// A row that also passed the time-valid filter.
struct Timed<'a> {
    located: Located<'a>,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

/// Cleans a raw incident table.
///
/// The input is not modified; surviving rows are returned as new
/// [`Incident`] values without derived time features.
#[must_use]
pub fn clean_incidents(raw: &[RawIncident]) -> (Vec<Incident>, CleaningReport) {
    let located: Vec<Located<'_>> = raw.iter().filter_map(locate).collect();
    let geo_required = StageLoss::new("geo-required", raw.len(), located.len());
    geo_required.log();

    let located_len = located.len();
    let timed: Vec<Timed<'_>> = located.into_iter().filter_map(time).collect();
    let time_valid = StageLoss::new("time-valid", located_len, timed.len());
    time_valid.log();

    let timed_len = timed.len();
    let incidents: Vec<Incident> = timed.into_iter().filter_map(coerce_numeric).collect();
    let numeric_valid = StageLoss::new("numeric-valid", timed_len, incidents.len());
    numeric_valid.log();

    (
        incidents,
        CleaningReport {
            geo_required,
            time_valid,
            numeric_valid,
        },
    )
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

fn locate(raw: &RawIncident) -> Option<Located<'_>> {
    Some(Located {
        raw,
        county: non_blank(raw.county.as_ref())?,
        state: non_blank(raw.state.as_ref())?,
        start_lat: parse_optional_number(raw.start_lat.as_ref())?,
        start_lng: parse_optional_number(raw.start_lng.as_ref())?,
    })
}

fn time(located: Located<'_>) -> Option<Timed<'_>> {
    let start_time = parse_timestamp(located.raw.start_time.as_deref()?)?;
    let end_time = parse_timestamp(located.raw.end_time.as_deref()?)?;
    Some(Timed {
        located,
        start_time,
        end_time,
    })
}

fn coerce_numeric(timed: Timed<'_>) -> Option<Incident> {
    let Timed {
        located,
        start_time,
        end_time,
    } = timed;
    let raw = located.raw;

    Some(Incident {
        id: raw.id.clone().unwrap_or_default(),
        start_time,
        end_time,
        severity: parse_optional_number(raw.severity.as_ref())?,
        distance_mi: parse_optional_number(raw.distance_mi.as_ref())?,
        temperature_f: parse_optional_number(raw.temperature_f.as_ref())?,
        visibility_mi: parse_optional_number(raw.visibility_mi.as_ref())?,
        precipitation_in: parse_optional_number(raw.precipitation_in.as_ref())?,
        county: located.county.to_string(),
        state: located.state.to_string(),
        start_lat: located.start_lat,
        start_lng: located.start_lng,
        time_features: None,
    })
}
