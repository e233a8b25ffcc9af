use std::fmt;

use chrono::{NaiveDateTime, Timelike};

use crate::config::AttendanceConfig;
use crate::model::attendance::Attendance;
use crate::utils::geo::get_distance_m;

/// Why a clock action was rejected. Every variant is a user input error
/// and surfaces verbatim as a 400 response; none is retried.
#[derive(Debug, PartialEq)]
pub enum ClockError {
    AlreadyCheckedIn,
    NotCheckedInYet,
    AlreadyCheckedOut,
    OutsideWindow {
        checking_in: bool,
        start_hour: u32,
        end_hour: u32,
    },
    TooFarFromCompany,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::AlreadyCheckedIn => {
                write!(f, "Check-in has already been recorded for today.")
            }
            ClockError::NotCheckedInYet => {
                write!(f, "You must check in before checking out.")
            }
            ClockError::AlreadyCheckedOut => {
                write!(f, "Check-out has already been recorded for today.")
            }
            ClockError::OutsideWindow {
                checking_in,
                start_hour,
                end_hour,
            } => {
                let action = if *checking_in { "Check-in" } else { "Check-out" };
                write!(
                    f,
                    "{action} is only allowed between {start_hour}:00 and {end_hour}:00."
                )
            }
            ClockError::TooFarFromCompany => {
                write!(
                    f,
                    "You are too far from the company location to perform this action."
                )
            }
        }
    }
}

/// Validates a clock action against the record's current state, the
/// allowed time-of-day window, and the company geofence.
///
/// States per (user, day): no check_in -> check_in set -> both set;
/// both-set is terminal. The geofence check runs for both directions
/// and is skipped entirely when either coordinate is absent.
pub fn validate_clock(
    attendance: &Attendance,
    is_check_in: bool,
    now: NaiveDateTime,
    location: Option<(f64, f64)>,
    cfg: &AttendanceConfig,
) -> Result<(), ClockError> {
    let current_hour = now.hour();

    if is_check_in {
        if attendance.check_in.is_some() {
            return Err(ClockError::AlreadyCheckedIn);
        }
        if !(cfg.check_in_start_hour..=cfg.check_in_end_hour).contains(&current_hour) {
            return Err(ClockError::OutsideWindow {
                checking_in: true,
                start_hour: cfg.check_in_start_hour,
                end_hour: cfg.check_in_end_hour,
            });
        }
    } else {
        if attendance.check_in.is_none() {
            return Err(ClockError::NotCheckedInYet);
        }
        if attendance.check_out.is_some() {
            return Err(ClockError::AlreadyCheckedOut);
        }
        if !(cfg.check_out_start_hour..=cfg.check_out_end_hour).contains(&current_hour) {
            return Err(ClockError::OutsideWindow {
                checking_in: false,
                start_hour: cfg.check_out_start_hour,
                end_hour: cfg.check_out_end_hour,
            });
        }
    }

    if let Some((latitude, longitude)) = location {
        let distance_m = get_distance_m(
            latitude,
            longitude,
            cfg.company_latitude,
            cfg.company_longitude,
        );
        if distance_m > cfg.location_radius_m {
            return Err(ClockError::TooFarFromCompany);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_attendance_config;
    use crate::model::attendance::test_record;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, min, 0).unwrap()
    }

    fn bare() -> Attendance {
        test_record(1, day(), None, None)
    }

    fn checked_in() -> Attendance {
        test_record(1, day(), Some(at(9, 0)), None)
    }

    #[test]
    fn check_in_succeeds_at_window_start() {
        let cfg = test_attendance_config();
        assert_eq!(validate_clock(&bare(), true, at(7, 0), None, &cfg), Ok(()));
    }

    #[test]
    fn check_in_window_is_inclusive_of_the_end_hour() {
        let cfg = test_attendance_config();
        assert_eq!(validate_clock(&bare(), true, at(10, 59), None, &cfg), Ok(()));
        assert!(validate_clock(&bare(), true, at(11, 0), None, &cfg).is_err());
    }

    #[test]
    fn check_in_before_window_is_rejected() {
        let cfg = test_attendance_config();
        let err = validate_clock(&bare(), true, at(6, 59), None, &cfg).unwrap_err();
        assert_eq!(
            err,
            ClockError::OutsideWindow {
                checking_in: true,
                start_hour: 7,
                end_hour: 10,
            }
        );
        assert!(err.to_string().contains("between 7:00 and 10:00"));
    }

    #[test]
    fn second_check_in_same_day_is_rejected() {
        let cfg = test_attendance_config();
        let err = validate_clock(&checked_in(), true, at(9, 30), None, &cfg).unwrap_err();
        assert_eq!(err, ClockError::AlreadyCheckedIn);
    }

    #[test]
    fn check_out_requires_a_prior_check_in() {
        let cfg = test_attendance_config();
        let err = validate_clock(&bare(), false, at(18, 0), None, &cfg).unwrap_err();
        assert_eq!(err, ClockError::NotCheckedInYet);
    }

    #[test]
    fn check_out_before_window_is_rejected() {
        let cfg = test_attendance_config();
        let err = validate_clock(&checked_in(), false, at(16, 59), None, &cfg).unwrap_err();
        assert_eq!(
            err,
            ClockError::OutsideWindow {
                checking_in: false,
                start_hour: 17,
                end_hour: 20,
            }
        );
    }

    #[test]
    fn check_out_succeeds_within_window() {
        let cfg = test_attendance_config();
        assert_eq!(
            validate_clock(&checked_in(), false, at(17, 0), None, &cfg),
            Ok(())
        );
        assert_eq!(
            validate_clock(&checked_in(), false, at(20, 30), None, &cfg),
            Ok(())
        );
    }

    #[test]
    fn checked_out_is_terminal() {
        let cfg = test_attendance_config();
        let done = test_record(1, day(), Some(at(9, 0)), Some(at(18, 0)));
        let err = validate_clock(&done, false, at(19, 0), None, &cfg).unwrap_err();
        assert_eq!(err, ClockError::AlreadyCheckedOut);
    }

    #[test]
    fn far_away_location_is_rejected_for_both_directions() {
        let cfg = test_attendance_config();
        // ~1 km north of the company.
        let far = Some((cfg.company_latitude + 0.009, cfg.company_longitude));

        let err = validate_clock(&bare(), true, at(9, 0), far, &cfg).unwrap_err();
        assert_eq!(err, ClockError::TooFarFromCompany);

        let err = validate_clock(&checked_in(), false, at(18, 0), far, &cfg).unwrap_err();
        assert_eq!(err, ClockError::TooFarFromCompany);
    }

    #[test]
    fn nearby_location_is_accepted() {
        let cfg = test_attendance_config();
        // ~50 m north of the company.
        let near = Some((cfg.company_latitude + 0.00045, cfg.company_longitude));
        assert_eq!(validate_clock(&bare(), true, at(9, 0), near, &cfg), Ok(()));
    }

    #[test]
    fn missing_location_skips_the_geofence_check() {
        let cfg = test_attendance_config();
        assert_eq!(validate_clock(&bare(), true, at(9, 0), None, &cfg), Ok(()));
    }

    #[test]
    fn zero_coordinates_read_as_no_location() {
        let cfg = test_attendance_config();
        // The degenerate-zero rule makes the distance 0, inside any radius.
        assert_eq!(
            validate_clock(&bare(), true, at(9, 0), Some((0.0, 0.0)), &cfg),
            Ok(())
        );
    }
}
