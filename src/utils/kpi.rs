use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AttendanceConfig;
use crate::model::attendance::{Attendance, AttendanceStatus};

/// Aggregation window granularity. `daily` is a declared choice with no
/// window resolution; resolving it is a caller error.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, derive_more::Display)]
pub enum KpiError {
    #[display(fmt = "Invalid periodicity (must be weekly, monthly, or yearly)")]
    InvalidPeriodicity,
}

/// Resolves a periodicity to a concrete [start, end) range anchored to
/// `now` (local wall-clock). `end` is always `now`.
pub fn period_range(
    periodicity: Periodicity,
    now: NaiveDateTime,
) -> Result<(NaiveDateTime, NaiveDateTime), KpiError> {
    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).expect("midnight is always valid");

    let start = match periodicity {
        Periodicity::Weekly => {
            // ISO weekday: Monday=1 .. Sunday=7
            let days_into_week = now.weekday().num_days_from_monday() as i64;
            midnight((now - Duration::days(days_into_week)).date())
        }
        Periodicity::Monthly => midnight(now.date().with_day(1).expect("day 1 always exists")),
        Periodicity::Yearly => midnight(
            NaiveDate::from_ymd_opt(now.year(), 1, 1).expect("Jan 1 always exists"),
        ),
        Periodicity::Daily => return Err(KpiError::InvalidPeriodicity),
    };

    Ok((start, now))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RateHours {
    /// Share of window days in the subset, percent, two decimals.
    #[schema(example = 33.33)]
    pub rate: f64,
    /// Sum of the relevant derived seconds across the subset.
    #[schema(example = 1200.0)]
    pub hours: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AbsenceCount {
    #[schema(example = 2)]
    pub total: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserKpis {
    pub delays: RateHours,
    pub additional_hours: RateHours,
    pub absences: AbsenceCount,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkHours {
    #[schema(example = 42)]
    pub user: u64,
    pub periodicity: Periodicity,
    /// ISO date string -> worked hours; zero-worked days included as 0.0.
    #[schema(value_type = Object)]
    pub hours_per_day: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamKpis {
    #[schema(example = 7)]
    pub team: u64,
    #[schema(example = "Platform", value_type = String)]
    pub team_name: String,
    #[schema(example = 5)]
    pub members_count: u64,
    pub delays: RateHours,
    pub additional_hours: RateHours,
    pub absences: AbsenceCount,
}

#[derive(Debug, PartialEq)]
pub struct PerformerTotal {
    pub user_id: u64,
    pub total_worked_seconds: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn rate_and_sum(subset: &[f64], total_days: usize) -> RateHours {
    RateHours {
        rate: round2(subset.len() as f64 / total_days as f64 * 100.0),
        hours: subset.iter().sum(),
    }
}

/// Per-user KPI aggregate over the records already scoped to the window.
/// An empty window divides by 1, not 0, yielding 0% rates.
pub fn compute_user_kpis(records: &[Attendance], cfg: &AttendanceConfig) -> UserKpis {
    let total_days = records.len().max(1);

    let delays: Vec<f64> = records
        .iter()
        .map(|r| r.delay_seconds(cfg))
        .filter(|&s| s > 0.0)
        .collect();
    let additional: Vec<f64> = records
        .iter()
        .map(|r| r.extra_seconds(cfg))
        .filter(|&s| s > 0.0)
        .collect();
    let absences = records
        .iter()
        .filter(|r| r.status() == AttendanceStatus::Absent)
        .count() as u64;

    UserKpis {
        delays: rate_and_sum(&delays, total_days),
        additional_hours: rate_and_sum(&additional, total_days),
        absences: AbsenceCount { total: absences },
    }
}

pub fn compute_work_hours(
    user_id: u64,
    periodicity: Periodicity,
    records: &[Attendance],
) -> WorkHours {
    let mut hours_per_day = BTreeMap::new();
    for record in records {
        hours_per_day.insert(
            record.day.format("%Y-%m-%d").to_string(),
            record.worked_seconds() / 3600.0,
        );
    }

    WorkHours {
        user: user_id,
        periodicity,
        hours_per_day,
    }
}

/// Same aggregate as [`compute_user_kpis`], over every member's records.
pub fn compute_team_kpis(
    team_id: u64,
    team_name: &str,
    members_count: u64,
    records: &[Attendance],
    cfg: &AttendanceConfig,
) -> TeamKpis {
    let kpis = compute_user_kpis(records, cfg);

    TeamKpis {
        team: team_id,
        team_name: team_name.to_string(),
        members_count,
        delays: kpis.delays,
        additional_hours: kpis.additional_hours,
        absences: kpis.absences,
    }
}

/// Total worked seconds per user, descending, limited to `count`.
/// Ties break by ascending user id so the order is deterministic.
pub fn best_performers(records: &[Attendance], count: usize) -> Vec<PerformerTotal> {
    let mut totals: HashMap<u64, f64> = HashMap::new();
    for record in records {
        *totals.entry(record.user_id).or_insert(0.0) += record.worked_seconds();
    }

    let mut ranked: Vec<PerformerTotal> = totals
        .into_iter()
        .map(|(user_id, total_worked_seconds)| PerformerTotal {
            user_id,
            total_worked_seconds,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_worked_seconds
            .partial_cmp(&a.total_worked_seconds)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(count);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_attendance_config;
    use crate::model::attendance::test_record;

    fn now() -> NaiveDateTime {
        // A Tuesday.
        NaiveDate::from_ymd_opt(2025, 10, 21)
            .unwrap()
            .and_hms_opt(14, 30, 45)
            .unwrap()
    }

    fn record(user_id: u64, day: u32, in_h: Option<u32>, out_h: Option<u32>) -> Attendance {
        let d = NaiveDate::from_ymd_opt(2025, 10, day).unwrap();
        test_record(
            user_id,
            d,
            in_h.map(|h| d.and_hms_opt(h, 0, 0).unwrap()),
            out_h.map(|h| d.and_hms_opt(h, 0, 0).unwrap()),
        )
    }

    #[test]
    fn weekly_window_starts_on_iso_monday_midnight() {
        let (start, end) = period_range(Periodicity::Weekly, now()).unwrap();
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2025, 10, 20)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(end, now());
    }

    #[test]
    fn weekly_window_on_a_monday_starts_that_same_day() {
        let monday = NaiveDate::from_ymd_opt(2025, 10, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let (start, _) = period_range(Periodicity::Weekly, monday).unwrap();
        assert_eq!(start.date(), monday.date());
    }

    #[test]
    fn monthly_window_starts_on_the_first() {
        let (start, _) = period_range(Periodicity::Monthly, now()).unwrap();
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2025, 10, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn yearly_window_starts_on_january_first() {
        let (start, _) = period_range(Periodicity::Yearly, now()).unwrap();
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn daily_periodicity_has_no_window_resolution() {
        assert!(period_range(Periodicity::Daily, now()).is_err());
    }

    #[test]
    fn empty_window_uses_denominator_of_one() {
        let cfg = test_attendance_config();
        let kpis = compute_user_kpis(&[], &cfg);
        assert_eq!(kpis.delays.rate, 0.0);
        assert_eq!(kpis.delays.hours, 0.0);
        assert_eq!(kpis.additional_hours.rate, 0.0);
        assert_eq!(kpis.absences.total, 0);
    }

    #[test]
    fn rates_are_rounded_to_two_decimals() {
        let cfg = test_attendance_config();
        // One delayed day (check-in 09:20) out of three.
        let records = vec![
            {
                let d = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
                test_record(1, d, Some(d.and_hms_opt(9, 20, 0).unwrap()), None)
            },
            record(1, 21, Some(8), Some(17)),
            record(1, 22, None, None),
        ];

        let kpis = compute_user_kpis(&records, &cfg);
        assert_eq!(kpis.delays.rate, 33.33);
        assert_eq!(kpis.delays.hours, 1200.0);
        assert_eq!(kpis.absences.total, 1);
    }

    #[test]
    fn additional_hours_only_count_positive_extra_time() {
        let cfg = test_attendance_config();
        let records = vec![
            record(1, 20, Some(9), Some(19)), // 10h worked, +1h extra
            record(1, 21, Some(9), Some(17)), // 8h worked, -1h shortfall
        ];

        let kpis = compute_user_kpis(&records, &cfg);
        assert_eq!(kpis.additional_hours.rate, 50.0);
        assert_eq!(kpis.additional_hours.hours, 3600.0);
    }

    #[test]
    fn work_hours_keeps_zero_worked_days() {
        let records = vec![record(1, 20, Some(9), Some(18)), record(1, 21, None, None)];
        let hours = compute_work_hours(1, Periodicity::Weekly, &records);

        assert_eq!(hours.hours_per_day["2025-10-20"], 9.0);
        assert_eq!(hours.hours_per_day["2025-10-21"], 0.0);
    }

    #[test]
    fn team_kpis_count_absences_with_the_canonical_status() {
        let cfg = test_attendance_config();
        let mut excused = record(2, 21, None, None);
        excused.is_excused = true;

        let records = vec![record(1, 21, None, None), excused];
        let kpis = compute_team_kpis(7, "Platform", 2, &records, &cfg);

        // The excused row must not be counted as absent.
        assert_eq!(kpis.absences.total, 1);
        assert_eq!(kpis.team, 7);
        assert_eq!(kpis.members_count, 2);
    }

    #[test]
    fn best_performers_rank_descending_and_truncate() {
        let records = vec![
            record(1, 20, Some(9), Some(17)), // 8h
            record(2, 20, Some(9), Some(19)), // 10h
            record(3, 20, Some(9), Some(18)), // 9h
        ];

        let top = best_performers(&records, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, 2);
        assert_eq!(top[1].user_id, 3);
        assert!(top[0].total_worked_seconds > top[1].total_worked_seconds);
    }

    #[test]
    fn best_performer_ties_break_by_ascending_user_id() {
        let records = vec![
            record(5, 20, Some(9), Some(18)),
            record(2, 20, Some(9), Some(18)),
            record(9, 20, Some(9), Some(18)),
        ];

        let top = best_performers(&records, 3);
        let ids: Vec<u64> = top.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn best_performers_sum_across_multiple_days() {
        let records = vec![
            record(1, 20, Some(9), Some(18)),
            record(1, 21, Some(9), Some(18)),
            record(2, 20, Some(9), Some(19)),
        ];

        let top = best_performers(&records, 10);
        assert_eq!(top[0].user_id, 1);
        assert_eq!(top[0].total_worked_seconds, 18.0 * 3600.0);
    }
}
