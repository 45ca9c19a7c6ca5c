use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A driving session as submitted by the user, before it has a database id.
///
/// Doubles as the create/update request body. `validate` collects every
/// violated rule so the caller can report them all at once, before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExperience {
    pub drive_datetime: DateTime<Utc>,
    pub km: f64,
    #[serde(default)]
    pub notes: String,
    pub weather_id: i64,
    pub traffic_id: i64,
    pub supervisor_id: i64,
    pub road_type_ids: Vec<i64>,
}

impl NewExperience {
    /// Returns human-readable validation errors; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.km.is_finite() || self.km <= 0.0 {
            errors.push("Please enter a valid distance (km > 0).".to_string());
        }

        if self.weather_id <= 0 {
            errors.push("Please select a weather condition.".to_string());
        }

        if self.traffic_id <= 0 {
            errors.push("Please select a traffic condition.".to_string());
        }

        if self.supervisor_id <= 0 {
            errors.push("Please select a supervisor.".to_string());
        }

        if self.road_type_ids.is_empty() {
            errors.push("Please select at least one road type.".to_string());
        } else if self.road_type_ids.iter().any(|id| *id <= 0) {
            errors.push("Road type selection is invalid.".to_string());
        } else {
            let unique: HashSet<i64> = self.road_type_ids.iter().copied().collect();
            if unique.len() != self.road_type_ids.len() {
                errors.push("Road types must not repeat.".to_string());
            }
        }

        errors
    }

    /// `validate` as a `Result`, for callers that want `?`.
    pub fn check(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// A persisted driving session with its database id and road-type set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrivingExperience {
    pub id: i64,
    pub drive_datetime: DateTime<Utc>,
    pub km: f64,
    pub notes: String,
    pub weather_id: i64,
    pub traffic_id: i64,
    pub supervisor_id: i64,
    pub road_type_ids: Vec<i64>,
}

/// Optional calendar-date filter, inclusive on both ends.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// First instant covered by the range.
    pub fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Last instant covered by the range. The end date itself is included.
    pub fn end_bound(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
            .map(|dt| dt.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_experience() -> NewExperience {
        NewExperience {
            drive_datetime: Utc.with_ymd_and_hms(2025, 3, 14, 15, 30, 0).unwrap(),
            km: 12.5,
            notes: "Night drive on wet roads".to_string(),
            weather_id: 1,
            traffic_id: 2,
            supervisor_id: 1,
            road_type_ids: vec![1, 3],
        }
    }

    #[test]
    fn test_valid_experience_passes() {
        assert!(valid_experience().validate().is_empty());
    }

    #[test]
    fn test_non_positive_distance_rejected() {
        let mut exp = valid_experience();
        exp.km = 0.0;
        let errors = exp.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("km > 0"));

        exp.km = -3.2;
        assert_eq!(exp.validate().len(), 1);

        exp.km = f64::NAN;
        assert_eq!(exp.validate().len(), 1);
    }

    #[test]
    fn test_missing_references_rejected() {
        let mut exp = valid_experience();
        exp.weather_id = 0;
        exp.traffic_id = -1;
        exp.supervisor_id = 0;

        let errors = exp.validate();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_road_types_required() {
        let mut exp = valid_experience();
        exp.road_type_ids.clear();

        let errors = exp.validate();
        assert_eq!(errors, vec!["Please select at least one road type.".to_string()]);
    }

    #[test]
    fn test_duplicate_road_types_rejected() {
        let mut exp = valid_experience();
        exp.road_type_ids = vec![1, 1, 2];

        let errors = exp.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("repeat"));
    }

    #[test]
    fn test_all_errors_collected_at_once() {
        let exp = NewExperience {
            drive_datetime: Utc::now(),
            km: 0.0,
            notes: String::new(),
            weather_id: 0,
            traffic_id: 0,
            supervisor_id: 0,
            road_type_ids: vec![],
        };

        assert_eq!(exp.validate().len(), 5);
    }

    #[test]
    fn test_date_range_bounds_inclusive() {
        let range = DateRange::new(
            Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            Some(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
        );

        let start = range.start_bound().unwrap();
        let end = range.end_bound().unwrap();

        // A drive at midnight on the start date is in range.
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(first >= start && first <= end);

        // A drive late on the end date is still in range.
        let last = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        assert!(last >= start && last <= end);

        // The next day is not.
        let after = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert!(after > end);
    }

    #[test]
    fn test_open_ended_range() {
        let range = DateRange::default();
        assert!(range.start_bound().is_none());
        assert!(range.end_bound().is_none());
    }

    #[test]
    fn test_check_wraps_errors() {
        assert!(valid_experience().check().is_ok());

        let mut exp = valid_experience();
        exp.km = 0.0;
        exp.road_type_ids.clear();

        match exp.check() {
            Err(Error::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
