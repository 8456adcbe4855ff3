use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Night shift reports in from the evening; before this local hour a
/// same-day roster slot still counts as scheduled, after it as present.
pub const EVENING_CUTOFF_HOUR: u32 = 19;

pub const DEFAULT_SHIFT_HOURS: f64 = 8.0;

/// The single effective status+hours for one (user, date). `derived` marks
/// values that were inferred from roster membership or display-promoted from
/// SCHEDULED; those are never written back to storage.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EffectiveAttendance {
    pub user_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub status: AttendanceStatus,
    pub work_hours: f64,
    pub overtime_hours: f64,
    pub derived: bool,
}

/// Merge an explicit record, roster membership and the clock into one result.
///
/// Priority: explicit record > roster inference > nothing. The clock is a
/// parameter rather than ambient state so the policy stays testable.
pub fn resolve(
    user_id: u64,
    date: NaiveDate,
    record: Option<&AttendanceRecord>,
    on_roster: bool,
    now: NaiveDateTime,
) -> EffectiveAttendance {
    let today = now.date();
    let evening = now.hour() >= EVENING_CUTOFF_HOUR;

    if let Some(rec) = record {
        // Display-only promotion: a SCHEDULED row for today flips to PRESENT
        // once the shift has started. The stored row keeps SCHEDULED.
        if rec.status == AttendanceStatus::Scheduled && date == today && evening {
            let hours = if rec.work_hours > 0.0 {
                rec.work_hours
            } else {
                DEFAULT_SHIFT_HOURS
            };
            return EffectiveAttendance {
                user_id,
                date,
                status: AttendanceStatus::Present,
                work_hours: hours,
                overtime_hours: rec.overtime_hours,
                derived: true,
            };
        }
        return EffectiveAttendance {
            user_id,
            date,
            status: rec.status,
            work_hours: rec.work_hours,
            overtime_hours: rec.overtime_hours,
            derived: false,
        };
    }

    if on_roster {
        let (status, work_hours) = if date < today {
            (AttendanceStatus::Present, DEFAULT_SHIFT_HOURS)
        } else if date == today {
            let status = if evening {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Scheduled
            };
            (status, DEFAULT_SHIFT_HOURS)
        } else {
            // Future roster days carry no worked hours yet.
            (AttendanceStatus::Scheduled, 0.0)
        };
        return EffectiveAttendance {
            user_id,
            date,
            status,
            work_hours,
            overtime_hours: 0.0,
            derived: true,
        };
    }

    EffectiveAttendance {
        user_id,
        date,
        status: AttendanceStatus::Unset,
        work_hours: 0.0,
        overtime_hours: 0.0,
        derived: true,
    }
}

/// Stats panel counts for one day's resolved set.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct DayStats {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub early_leave: usize,
    pub off_day: usize,
    pub scheduled: usize,
}

pub fn day_stats(resolved: &[EffectiveAttendance]) -> DayStats {
    let mut stats = DayStats::default();
    for entry in resolved {
        match entry.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
            AttendanceStatus::EarlyLeave => stats.early_leave += 1,
            AttendanceStatus::OffDay => stats.off_day += 1,
            AttendanceStatus::Scheduled => stats.scheduled += 1,
            AttendanceStatus::Unset => {}
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, hour: u32) -> NaiveDateTime {
        d.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    fn record(status: AttendanceStatus, work: f64, overtime: f64) -> AttendanceRecord {
        AttendanceRecord {
            user_id: 1,
            date: date(2024, 5, 10),
            status,
            work_hours: work,
            overtime_hours: overtime,
        }
    }

    #[test]
    fn explicit_record_wins_verbatim() {
        let rec = record(AttendanceStatus::Late, 6.0, 0.0);
        let now = at(date(2024, 5, 10), 21);
        let out = resolve(1, date(2024, 5, 10), Some(&rec), true, now);
        assert_eq!(out.status, AttendanceStatus::Late);
        assert_eq!(out.work_hours, 6.0);
        assert!(!out.derived);
    }

    #[test]
    fn scheduled_today_promotes_after_cutoff() {
        let rec = record(AttendanceStatus::Scheduled, 0.0, 0.0);
        let today = date(2024, 5, 10);
        let out = resolve(1, today, Some(&rec), false, at(today, 19));
        assert_eq!(out.status, AttendanceStatus::Present);
        assert_eq!(out.work_hours, 8.0);
        assert!(out.derived, "promotion is display-only");
    }

    #[test]
    fn scheduled_today_keeps_recorded_hours_when_promoted() {
        let rec = record(AttendanceStatus::Scheduled, 7.5, 0.0);
        let today = date(2024, 5, 10);
        let out = resolve(1, today, Some(&rec), false, at(today, 23));
        assert_eq!(out.work_hours, 7.5);
    }

    #[test]
    fn scheduled_today_stays_before_cutoff() {
        let rec = record(AttendanceStatus::Scheduled, 0.0, 0.0);
        let today = date(2024, 5, 10);
        let out = resolve(1, today, Some(&rec), false, at(today, 18));
        assert_eq!(out.status, AttendanceStatus::Scheduled);
        assert!(!out.derived);
    }

    #[test]
    fn scheduled_on_other_days_never_promotes() {
        let rec = record(AttendanceStatus::Scheduled, 0.0, 0.0);
        let now = at(date(2024, 5, 11), 21);
        let out = resolve(1, date(2024, 5, 10), Some(&rec), false, now);
        assert_eq!(out.status, AttendanceStatus::Scheduled);
    }

    #[test]
    fn past_roster_day_defaults_present() {
        let now = at(date(2024, 5, 12), 10);
        let out = resolve(1, date(2024, 5, 10), None, true, now);
        assert_eq!(out.status, AttendanceStatus::Present);
        assert_eq!(out.work_hours, 8.0);
        assert_eq!(out.overtime_hours, 0.0);
        assert!(out.derived);
    }

    #[test]
    fn today_roster_day_flips_at_cutoff() {
        let today = date(2024, 5, 10);
        let before = resolve(1, today, None, true, at(today, 18));
        assert_eq!(before.status, AttendanceStatus::Scheduled);
        assert_eq!(before.work_hours, 8.0);

        let after = resolve(1, today, None, true, at(today, 19));
        assert_eq!(after.status, AttendanceStatus::Present);
        assert_eq!(after.work_hours, 8.0);
    }

    #[test]
    fn future_roster_day_is_scheduled_with_zero_hours() {
        let now = at(date(2024, 5, 10), 20);
        let out = resolve(1, date(2024, 5, 11), None, true, now);
        assert_eq!(out.status, AttendanceStatus::Scheduled);
        assert_eq!(out.work_hours, 0.0);
    }

    #[test]
    fn no_record_no_roster_is_unset() {
        let now = at(date(2024, 5, 10), 20);
        let out = resolve(1, date(2024, 5, 9), None, false, now);
        assert_eq!(out.status, AttendanceStatus::Unset);
        assert_eq!(out.work_hours, 0.0);
        assert_eq!(out.overtime_hours, 0.0);
    }

    // Past Friday, four roster workers, no explicit rows: everyone present,
    // stats panel counts four.
    #[test]
    fn full_team_past_day_reconciles_present() {
        let now = at(date(2024, 5, 13), 9);
        let day = date(2024, 5, 10);
        let resolved: Vec<_> = (1..=4)
            .map(|uid| resolve(uid, day, None, true, now))
            .collect();
        for entry in &resolved {
            assert_eq!(entry.status, AttendanceStatus::Present);
            assert_eq!(entry.work_hours, 8.0);
            assert_eq!(entry.overtime_hours, 0.0);
        }
        assert_eq!(day_stats(&resolved).present, 4);
    }
}
