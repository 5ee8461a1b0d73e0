//! Feature deriver.
//!
//! Computes time-of-day and day-of-week behavioral features from each
//! incident's start timestamp.

use accident_risk_incident_models::{Incident, TimeFeatures};
use chrono::{Datelike as _, NaiveDateTime, Timelike as _};

/// First hour (inclusive) counted as night.
pub const NIGHT_STARTS_AT: u32 = 20;

/// First hour (inclusive) no longer counted as night.
pub const NIGHT_ENDS_AT: u32 = 6;

/// First weekend day, Monday = 0.
pub const WEEKEND_STARTS_ON: u32 = 5;

/// Returns whether `hour` (0-23) is at night.
#[must_use]
pub const fn is_night(hour: u32) -> bool {
    hour < NIGHT_ENDS_AT || hour >= NIGHT_STARTS_AT
}

/// Returns whether `day` (Monday = 0) falls on a weekend.
#[must_use]
pub const fn is_weekend(day: u32) -> bool {
    day >= WEEKEND_STARTS_ON
}

/// Derives the time features of a single timestamp.
#[must_use]
pub fn time_features(at: NaiveDateTime) -> TimeFeatures {
    let hour = at.hour();
    let day_of_week = at.weekday().num_days_from_monday();
    TimeFeatures {
        hour,
        is_night: is_night(hour),
        day_of_week,
        is_weekend: is_weekend(day_of_week),
    }
}

/// Returns a copy of `incidents` with time features populated.
#[must_use]
pub fn derive_features(incidents: &[Incident]) -> Vec<Incident> {
    incidents
        .iter()
        .map(|incident| Incident {
            time_features: Some(time_features(incident.start_time)),
            ..incident.clone()
        })
        .collect()
}

/// Returns a copy of the incidents that started in `year`.
#[must_use]
pub fn incidents_in_year(incidents: &[Incident], year: i32) -> Vec<Incident> {
    incidents
        .iter()
        .filter(|incident| incident.start_time.year() == year)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn incident(start_time: NaiveDateTime) -> Incident {
        Incident {
            id: "A-1".to_string(),
            start_time,
            end_time: start_time,
            severity: 3.0,
            distance_mi: 1.0,
            temperature_f: 60.0,
            visibility_mi: 10.0,
            precipitation_in: 0.0,
            county: "Cook".to_string(),
            state: "IL".to_string(),
            start_lat: 41.8,
            start_lng: -87.6,
            time_features: None,
        }
    }

    #[test]
    fn night_covers_exactly_20_through_5() {
        for hour in 0..24 {
            assert_eq!(is_night(hour), !(6..20).contains(&hour), "hour {hour}");
        }
        assert!(is_night(5));
        assert!(!is_night(6));
        assert!(!is_night(19));
        assert!(is_night(20));
    }

    #[test]
    fn weekend_is_saturday_and_sunday() {
        for day in 0..5 {
            assert!(!is_weekend(day), "day {day}");
        }
        assert!(is_weekend(5));
        assert!(is_weekend(6));
    }

    #[test]
    fn derives_features_from_start_time() {
        // 2020-03-07 was a Saturday.
        let features = time_features(at(2020, 3, 7, 21));
        assert_eq!(features.hour, 21);
        assert!(features.is_night);
        assert_eq!(features.day_of_week, 5);
        assert!(features.is_weekend);

        // 2020-03-04 was a Wednesday.
        let features = time_features(at(2020, 3, 4, 12));
        assert_eq!(features.day_of_week, 2);
        assert!(!features.is_night);
        assert!(!features.is_weekend);
    }

    #[test]
    fn derive_features_copies_input() {
        let input = vec![incident(at(2021, 6, 1, 3))];
        let output = derive_features(&input);
        assert!(input[0].time_features.is_none());
        assert_eq!(output[0].time_features.map(|f| f.hour), Some(3));
    }

    #[test]
    fn filters_by_start_year() {
        let input = vec![
            incident(at(2019, 12, 31, 23)),
            incident(at(2020, 1, 1, 0)),
            incident(at(2020, 12, 31, 23)),
            incident(at(2021, 1, 1, 0)),
        ];
        assert_eq!(incidents_in_year(&input, 2020).len(), 2);
        assert!(incidents_in_year(&input, 1999).is_empty());
    }
}
