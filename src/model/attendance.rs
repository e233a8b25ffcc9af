use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AttendanceConfig;

/// Daily attendance status, derived from the record (never stored).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, strum_macros::Display, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Absent,
    Present,
    Excused,
}

/// One row per (user, day); the pair is UNIQUE at the database level.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub day: NaiveDate,
    #[schema(example = "2026-01-05T08:12:00", format = "date-time", value_type = Option<String>)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-05T18:03:00", format = "date-time", value_type = Option<String>)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = false)]
    pub is_excused: bool,
    #[schema(example = "medical appointment", value_type = Option<String>)]
    pub excuse_reason: Option<String>,
    #[schema(example = "2026-01-05T00:05:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Attendance {
    /// Elapsed seconds between check-in and check-out, 0 unless both are set.
    pub fn worked_seconds(&self) -> f64 {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => (check_out - check_in).num_seconds() as f64,
            _ => 0.0,
        }
    }

    /// Worked seconds beyond the expected shift length. Negative values
    /// indicate a shortfall; only positive values count as additional hours.
    pub fn extra_seconds(&self, cfg: &AttendanceConfig) -> f64 {
        self.worked_seconds() - cfg.expected_shift_seconds()
    }

    /// Seconds past the on-time reference hour at which check-in happened,
    /// 0 without a check-in. Negative for early arrivals.
    pub fn delay_seconds(&self, cfg: &AttendanceConfig) -> f64 {
        match self.check_in {
            Some(check_in) => {
                check_in.time().num_seconds_from_midnight() as f64
                    - (cfg.check_in_hour * 3600) as f64
            }
            None => 0.0,
        }
    }

    /// Excused wins over everything else, then presence is a check-in.
    pub fn status(&self) -> AttendanceStatus {
        if self.is_excused {
            AttendanceStatus::Excused
        } else if self.check_in.is_some() {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        }
    }
}

#[cfg(test)]
pub fn test_record(
    user_id: u64,
    day: NaiveDate,
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
) -> Attendance {
    Attendance {
        id: 0,
        user_id,
        day,
        check_in,
        check_out,
        is_excused: false,
        excuse_reason: None,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_attendance_config;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn worked_seconds_is_exact_check_out_minus_check_in() {
        let record = test_record(1, day(), Some(at(9, 0)), Some(at(18, 30)));
        assert_eq!(record.worked_seconds(), 9.5 * 3600.0);
    }

    #[test]
    fn worked_seconds_is_zero_without_both_timestamps() {
        assert_eq!(test_record(1, day(), None, None).worked_seconds(), 0.0);
        assert_eq!(
            test_record(1, day(), Some(at(9, 0)), None).worked_seconds(),
            0.0
        );
    }

    #[test]
    fn extra_seconds_can_be_negative_on_short_days() {
        let cfg = test_attendance_config();
        let record = test_record(1, day(), Some(at(9, 0)), Some(at(17, 0)));
        assert_eq!(record.extra_seconds(&cfg), -3600.0);
    }

    #[test]
    fn delay_seconds_measures_lateness_past_reference_hour() {
        let cfg = test_attendance_config();
        let record = test_record(1, day(), Some(at(9, 20)), None);
        assert_eq!(record.delay_seconds(&cfg), 1200.0);

        // Early arrival is a negative delay, not a positive one.
        let early = test_record(1, day(), Some(at(8, 0)), None);
        assert_eq!(early.delay_seconds(&cfg), -3600.0);
    }

    #[test]
    fn delay_seconds_is_zero_without_check_in() {
        let cfg = test_attendance_config();
        assert_eq!(test_record(1, day(), None, None).delay_seconds(&cfg), 0.0);
    }

    #[test]
    fn status_is_exactly_one_of_the_three_choices() {
        let bare = test_record(1, day(), None, None);
        assert_eq!(bare.status(), AttendanceStatus::Absent);

        let present = test_record(1, day(), Some(at(9, 0)), None);
        assert_eq!(present.status(), AttendanceStatus::Present);
    }

    #[test]
    fn excused_wins_regardless_of_check_in() {
        let mut record = test_record(1, day(), Some(at(9, 0)), Some(at(18, 0)));
        record.is_excused = true;
        record.excuse_reason = Some("medical appointment".to_string());
        assert_eq!(record.status(), AttendanceStatus::Excused);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(AttendanceStatus::Absent.to_string(), "absent");
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Excused).unwrap(),
            "\"excused\""
        );
    }
}
