#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Traffic incident record types and column definitions.
//!
//! Raw incident rows arrive as loosely-typed strings ([`RawIncident`]) and
//! are promoted to [`Incident`] only after every required field has been
//! validated and coerced. [`IncidentColumn`] names the columns that the
//! county aggregation can reduce over.

use accident_risk_geography_models::StateLabeled;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Columns that must be present in the incident source header.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "ID",
    "Start_Time",
    "End_Time",
    "Severity",
    "Distance(mi)",
    "Temperature(F)",
    "Visibility(mi)",
    "Precipitation(in)",
    "County",
    "State",
    "Start_Lat",
    "Start_Lng",
];

/// An incident row exactly as read from the source file.
///
/// Every field is optional: an empty cell deserializes to `None`. Columns
/// in the source that are not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIncident {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    #[serde(rename = "Start_Time")]
    pub start_time: Option<String>,
    #[serde(rename = "End_Time")]
    pub end_time: Option<String>,
    #[serde(rename = "Severity")]
    pub severity: Option<String>,
    #[serde(rename = "Distance(mi)")]
    pub distance_mi: Option<String>,
    #[serde(rename = "Temperature(F)")]
    pub temperature_f: Option<String>,
    #[serde(rename = "Visibility(mi)")]
    pub visibility_mi: Option<String>,
    #[serde(rename = "Precipitation(in)")]
    pub precipitation_in: Option<String>,
    #[serde(rename = "County")]
    pub county: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Start_Lat")]
    pub start_lat: Option<String>,
    #[serde(rename = "Start_Lng")]
    pub start_lng: Option<String>,
}

/// Behavioral features derived from an incident's start timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFeatures {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// True when `hour < 6` or `hour >= 20`.
    pub is_night: bool,
    /// Day of week, Monday = 0 through Sunday = 6.
    pub day_of_week: u32,
    /// True on Saturday and Sunday (`day_of_week >= 5`).
    pub is_weekend: bool,
}

/// A validated traffic incident.
///
/// Produced only by the record cleaner, so every field is known to be
/// present and numeric fields are known to be finite numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Source identifier (e.g. `"A-1"`).
    pub id: String,
    /// When the incident started.
    pub start_time: NaiveDateTime,
    /// When the incident's impact on traffic ended.
    pub end_time: NaiveDateTime,
    /// Ordinal severity (1 = least impact).
    pub severity: f64,
    /// Length of road affected, in miles.
    pub distance_mi: f64,
    /// Temperature in degrees Fahrenheit.
    pub temperature_f: f64,
    /// Visibility in miles.
    pub visibility_mi: f64,
    /// Precipitation in inches.
    pub precipitation_in: f64,
    /// County name as written in the source.
    pub county: String,
    /// State, either a two-letter code or a full name.
    pub state: String,
    /// Start latitude (WGS84).
    pub start_lat: f64,
    /// Start longitude (WGS84).
    pub start_lng: f64,
    /// Derived time features. `None` until the feature deriver has run.
    pub time_features: Option<TimeFeatures>,
}

impl StateLabeled for Incident {
    fn state(&self) -> &str {
        &self.state
    }

    fn set_state(&mut self, state: String) {
        self.state = state;
    }
}

/// A column of the incident table that the county aggregator can reduce.
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
pub enum IncidentColumn {
    #[serde(rename = "ID")]
    #[strum(serialize = "ID")]
    Id,
    #[serde(rename = "Severity")]
    #[strum(serialize = "Severity")]
    Severity,
    #[serde(rename = "Distance(mi)")]
    #[strum(serialize = "Distance(mi)")]
    Distance,
    #[serde(rename = "Temperature(F)")]
    #[strum(serialize = "Temperature(F)")]
    Temperature,
    #[serde(rename = "Visibility(mi)")]
    #[strum(serialize = "Visibility(mi)")]
    Visibility,
    #[serde(rename = "Precipitation(in)")]
    #[strum(serialize = "Precipitation(in)")]
    Precipitation,
    #[serde(rename = "Hour")]
    #[strum(serialize = "Hour")]
    Hour,
    #[serde(rename = "Is_Night")]
    #[strum(serialize = "Is_Night")]
    IsNight,
    #[serde(rename = "Day_of_Week")]
    #[strum(serialize = "Day_of_Week")]
    DayOfWeek,
    #[serde(rename = "Is_Weekend")]
    #[strum(serialize = "Is_Weekend")]
    IsWeekend,
}

impl IncidentColumn {
    /// Returns whether this column holds a value for `incident`.
    ///
    /// Derived columns are absent until the feature deriver has run. A
    /// blank identifier is absent, so it is not counted.
    #[must_use]
    pub fn is_present(self, incident: &Incident) -> bool {
        match self {
            Self::Id => !incident.id.trim().is_empty(),
            Self::Severity
            | Self::Distance
            | Self::Temperature
            | Self::Visibility
            | Self::Precipitation => true,
            Self::Hour | Self::IsNight | Self::DayOfWeek | Self::IsWeekend => {
                incident.time_features.is_some()
            }
        }
    }

    /// Returns this column's numeric value for `incident`.
    ///
    /// Booleans read as `0.0`/`1.0`. The identifier is not numeric and
    /// always returns `None`.
    #[must_use]
    pub fn numeric(self, incident: &Incident) -> Option<f64> {
        let features = incident.time_features;
        match self {
            Self::Id => None,
            Self::Severity => Some(incident.severity),
            Self::Distance => Some(incident.distance_mi),
            Self::Temperature => Some(incident.temperature_f),
            Self::Visibility => Some(incident.visibility_mi),
            Self::Precipitation => Some(incident.precipitation_in),
            Self::Hour => features.map(|f| f64::from(f.hour)),
            Self::IsNight => features.map(|f| f64::from(u8::from(f.is_night))),
            Self::DayOfWeek => features.map(|f| f64::from(f.day_of_week)),
            Self::IsWeekend => features.map(|f| f64::from(u8::from(f.is_weekend))),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Id,
            Self::Severity,
            Self::Distance,
            Self::Temperature,
            Self::Visibility,
            Self::Precipitation,
            Self::Hour,
            Self::IsNight,
            Self::DayOfWeek,
            Self::IsWeekend,
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use chrono::NaiveDate;

    use super::*;

    fn incident(time_features: Option<TimeFeatures>) -> Incident {
        let at = NaiveDate::from_ymd_opt(2020, 3, 7)
            .unwrap()
            .and_hms_opt(21, 15, 0)
            .unwrap();
        Incident {
            id: "A-1".to_string(),
            start_time: at,
            end_time: at,
            severity: 2.0,
            distance_mi: 0.5,
            temperature_f: 40.0,
            visibility_mi: 10.0,
            precipitation_in: 0.0,
            county: "Travis".to_string(),
            state: "TX".to_string(),
            start_lat: 30.2,
            start_lng: -97.7,
            time_features,
        }
    }

    #[test]
    fn column_names_match_source_headers() {
        for column in IncidentColumn::all() {
            let parsed = IncidentColumn::from_str(column.as_ref()).unwrap();
            assert_eq!(parsed, *column);
        }
        assert_eq!(IncidentColumn::Distance.to_string(), "Distance(mi)");
        assert_eq!(IncidentColumn::IsNight.as_ref(), "Is_Night");
    }

    #[test]
    fn derived_columns_absent_before_derivation() {
        let raw = incident(None);
        assert!(!IncidentColumn::IsNight.is_present(&raw));
        assert_eq!(IncidentColumn::IsNight.numeric(&raw), None);
        assert!(IncidentColumn::Severity.is_present(&raw));
    }

    #[test]
    fn booleans_read_as_zero_or_one() {
        let enriched = incident(Some(TimeFeatures {
            hour: 21,
            is_night: true,
            day_of_week: 5,
            is_weekend: true,
        }));
        assert_eq!(IncidentColumn::IsNight.numeric(&enriched), Some(1.0));
        assert_eq!(IncidentColumn::IsWeekend.numeric(&enriched), Some(1.0));
        assert_eq!(IncidentColumn::Hour.numeric(&enriched), Some(21.0));
    }

    #[test]
    fn identifier_is_present_but_not_numeric() {
        let raw = incident(None);
        assert!(IncidentColumn::Id.is_present(&raw));
        assert_eq!(IncidentColumn::Id.numeric(&raw), None);
    }

    #[test]
    fn blank_identifier_is_absent() {
        let mut raw = incident(None);
        raw.id = "  ".to_string();
        assert!(!IncidentColumn::Id.is_present(&raw));
    }
}
