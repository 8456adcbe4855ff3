use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::core::position::{Position, REQUIRED_POSITIONS};
use crate::model::attendance::AttendanceRecord;
use crate::model::daily_log::DailyLog;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::roster::RosterAssignment;

/// A site-wide holiday note. When present among a day's untagged logs it
/// supersedes the individual 휴무 badges for that day.
pub const SITE_HOLIDAY_MARKER: &str = "웅동 휴무";

/// Marker string of the auto-generated coverage note.
pub const COVERAGE_NOTE_MARKER: &str = "근무성립불가";

/// Coverage is only checked for teams with this many non-OP workers.
pub const COVERAGE_MIN_HEADCOUNT: usize = 4;

/// The four bracketed tags the calendar groups by. Anything else stays an
/// individual note.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display, EnumString, ToSchema,
)]
pub enum NoteTag {
    #[serde(rename = "결근")]
    #[strum(serialize = "결근")]
    Absent,
    #[serde(rename = "지각")]
    #[strum(serialize = "지각")]
    Late,
    #[serde(rename = "조퇴")]
    #[strum(serialize = "조퇴")]
    EarlyLeave,
    #[serde(rename = "휴무")]
    #[strum(serialize = "휴무")]
    DayOff,
}

/// `[tag] name` with optional whitespace after the bracket. Only the four
/// group tags match; everything else is an "other" log.
pub fn parse_tagged(content: &str) -> Option<(NoteTag, &str)> {
    let rest = content.strip_prefix('[')?;
    let close = rest.find(']')?;
    let tag: NoteTag = rest[..close].parse().ok()?;
    let name = rest[close + 1..].trim();
    if name.is_empty() {
        return None;
    }
    Some((tag, name))
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupedBadge {
    #[schema(value_type = String)]
    pub tag: NoteTag,
    pub names: Vec<String>,
}

impl GroupedBadge {
    pub fn badge_text(&self) -> String {
        format!("[{}] {}", self.tag, self.names.join(", "))
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DayNotes {
    pub badges: Vec<GroupedBadge>,
    pub others: Vec<DailyLog>,
}

/// Group one day's logs into deduplicated badges plus pass-through notes.
pub fn group_logs(logs: &[DailyLog]) -> DayNotes {
    let mut groups: BTreeMap<NoteTag, BTreeSet<String>> = BTreeMap::new();
    let mut others: Vec<DailyLog> = Vec::new();

    for log in logs {
        match parse_tagged(&log.content) {
            Some((tag, name)) => {
                groups.entry(tag).or_default().insert(name.to_string());
            }
            None => others.push(log.clone()),
        }
    }

    let site_holiday = others
        .iter()
        .any(|log| log.content.contains(SITE_HOLIDAY_MARKER));
    if site_holiday {
        groups.remove(&NoteTag::DayOff);
    }

    let badges = groups
        .into_iter()
        .map(|(tag, names)| GroupedBadge {
            tag,
            names: names.into_iter().collect(),
        })
        .collect();

    DayNotes { badges, others }
}

/// Quorum rule: surface the day's max overtime only when at least half of the
/// day's records carry an hour or more of it, so an outlier never paints the
/// calendar.
pub fn display_overtime(records: &[AttendanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let with_overtime = records.iter().filter(|r| r.overtime_hours >= 1.0).count();
    if with_overtime * 2 < records.len() {
        return 0.0;
    }
    records
        .iter()
        .map(|r| r.overtime_hours)
        .fold(0.0, f64::max)
}

/// Teams with a full crew but a hole in a required position. OP slots do not
/// count toward headcount. Returns sorted team names.
pub fn understaffed_teams(assignments: &[RosterAssignment]) -> Vec<String> {
    let mut by_team: BTreeMap<&str, Vec<Position>> = BTreeMap::new();
    for a in assignments {
        if a.position != Position::Op {
            by_team.entry(a.team.as_str()).or_default().push(a.position);
        }
    }

    by_team
        .into_iter()
        .filter(|(_, positions)| positions.len() >= COVERAGE_MIN_HEADCOUNT)
        .filter(|(_, positions)| {
            REQUIRED_POSITIONS
                .iter()
                .any(|req| !positions.contains(req))
        })
        .map(|(team, _)| team.to_string())
        .collect()
}

pub fn coverage_note_content(teams: &[String]) -> String {
    format!("{} {}", teams.join(", "), COVERAGE_NOTE_MARKER)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveCellView {
    pub user_id: u64,
    #[schema(value_type = String)]
    pub leave_type: crate::model::leave_request::LeaveType,
    /// true while the request is still PENDING; renders distinctly.
    pub pending: bool,
}

/// One calendar day as the monthly view consumes it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarCell {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub badges: Vec<GroupedBadge>,
    pub other_logs: Vec<DailyLog>,
    pub leaves: Vec<LeaveCellView>,
    pub display_overtime: f64,
}

/// Project the month's logs, leaves and attendance onto one cell per day.
pub fn build_month_cells(
    year: i32,
    month: u32,
    logs: &[DailyLog],
    leaves: &[LeaveRequest],
    attendance: &[AttendanceRecord],
) -> Vec<CalendarCell> {
    let mut logs_by_day: HashMap<NaiveDate, Vec<DailyLog>> = HashMap::new();
    for log in logs {
        logs_by_day.entry(log.date).or_default().push(log.clone());
    }
    let mut attendance_by_day: HashMap<NaiveDate, Vec<AttendanceRecord>> = HashMap::new();
    for rec in attendance {
        attendance_by_day.entry(rec.date).or_default().push(rec.clone());
    }

    let mut cells = Vec::new();
    let mut day = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return cells,
    };
    while day.month() == month {
        let notes = group_logs(logs_by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]));
        let day_leaves = leaves
            .iter()
            .filter(|l| l.covers(day))
            .filter(|l| {
                matches!(
                    l.status,
                    LeaveStatus::Pending | LeaveStatus::Approved | LeaveStatus::CancellationPending
                )
            })
            .map(|l| LeaveCellView {
                user_id: l.user_id,
                leave_type: l.leave_type,
                pending: l.status == LeaveStatus::Pending,
            })
            .collect();
        let overtime = display_overtime(
            attendance_by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]),
        );

        cells.push(CalendarCell {
            date: day,
            badges: notes.badges,
            other_logs: notes.others,
            leaves: day_leaves,
            display_overtime: overtime,
        });

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::leave_request::LeaveType;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn log(id: u64, d: u32, content: &str) -> DailyLog {
        DailyLog {
            id,
            date: date(d),
            content: content.to_string(),
            author: "관리자".to_string(),
            created_at: None,
        }
    }

    fn record(user_id: u64, d: u32, overtime: f64) -> AttendanceRecord {
        AttendanceRecord {
            user_id,
            date: date(d),
            status: AttendanceStatus::Present,
            work_hours: 8.0,
            overtime_hours: overtime,
        }
    }

    fn assignment(user_id: u64, team: &str, position: Position) -> RosterAssignment {
        RosterAssignment {
            user_id,
            user_name: None,
            team: team.to_string(),
            position,
        }
    }

    #[test]
    fn parses_group_tags_only() {
        assert_eq!(parse_tagged("[결근] 홍길동"), Some((NoteTag::Absent, "홍길동")));
        assert_eq!(parse_tagged("[지각]김철수"), Some((NoteTag::Late, "김철수")));
        assert_eq!(parse_tagged("[비고] 기타"), None);
        assert_eq!(parse_tagged("평문 메모"), None);
        assert_eq!(parse_tagged("[결근]"), None);
    }

    #[test]
    fn groups_dedupe_trimmed_names() {
        let logs = vec![
            log(1, 10, "[결근] 홍길동"),
            log(2, 10, "[결근]   홍길동  "),
            log(3, 10, "[결근] 김철수"),
        ];
        let notes = group_logs(&logs);
        assert_eq!(notes.badges.len(), 1);
        assert_eq!(notes.badges[0].tag, NoteTag::Absent);
        assert_eq!(notes.badges[0].names, vec!["김철수", "홍길동"]);
        assert_eq!(notes.badges[0].badge_text(), "[결근] 김철수, 홍길동");
    }

    #[test]
    fn unmatched_logs_stay_individual() {
        let logs = vec![log(1, 10, "전달 사항: 안전 교육"), log(2, 10, "[지각] 박영희")];
        let notes = group_logs(&logs);
        assert_eq!(notes.badges.len(), 1);
        assert_eq!(notes.others.len(), 1);
        assert_eq!(notes.others[0].id, 1);
    }

    #[test]
    fn site_holiday_suppresses_day_off_group() {
        let logs = vec![log(1, 10, "웅동 휴무"), log(2, 10, "[휴무] 홍길동")];
        let notes = group_logs(&logs);
        assert!(notes.badges.iter().all(|b| b.tag != NoteTag::DayOff));
        assert_eq!(notes.others.len(), 1);
        assert_eq!(notes.others[0].content, "웅동 휴무");
    }

    #[test]
    fn site_holiday_leaves_other_groups_alone() {
        let logs = vec![
            log(1, 10, "오늘은 웅동 휴무 입니다"),
            log(2, 10, "[휴무] 홍길동"),
            log(3, 10, "[결근] 김철수"),
        ];
        let notes = group_logs(&logs);
        assert_eq!(notes.badges.len(), 1);
        assert_eq!(notes.badges[0].tag, NoteTag::Absent);
    }

    #[test]
    fn overtime_needs_quorum() {
        // 2 of 4 at >= 1h meets the half threshold
        let records = vec![record(1, 10, 2.0), record(2, 10, 1.0), record(3, 10, 0.0), record(4, 10, 0.5)];
        assert_eq!(display_overtime(&records), 2.0);

        // 1 of 4 does not
        let records = vec![record(1, 10, 3.0), record(2, 10, 0.0), record(3, 10, 0.0), record(4, 10, 0.0)];
        assert_eq!(display_overtime(&records), 0.0);

        assert_eq!(display_overtime(&[]), 0.0);
    }

    #[test]
    fn understaffed_team_detected() {
        // 4 workers but nobody on 상하역
        let assignments = vec![
            assignment(1, "1조", Position::Inspection),
            assignment(2, "1조", Position::Fork),
            assignment(3, "1조", Position::Clamp),
            assignment(4, "1조", Position::Fork),
        ];
        assert_eq!(understaffed_teams(&assignments), vec!["1조"]);
        let note = coverage_note_content(&understaffed_teams(&assignments));
        assert!(note.contains("1조"));
        assert!(note.contains(COVERAGE_NOTE_MARKER));
    }

    #[test]
    fn full_coverage_is_clean() {
        let assignments = vec![
            assignment(1, "1조", Position::Inspection),
            assignment(2, "1조", Position::Fork),
            assignment(3, "1조", Position::Clamp),
            assignment(4, "1조", Position::Loading),
        ];
        assert!(understaffed_teams(&assignments).is_empty());
    }

    #[test]
    fn small_teams_and_op_are_ignored() {
        // three non-OP workers plus an OP: below the headcount floor
        let assignments = vec![
            assignment(1, "2조", Position::Inspection),
            assignment(2, "2조", Position::Fork),
            assignment(3, "2조", Position::Clamp),
            assignment(4, "2조", Position::Op),
        ];
        assert!(understaffed_teams(&assignments).is_empty());
    }

    #[test]
    fn month_cells_cover_every_day() {
        let cells = build_month_cells(2024, 5, &[], &[], &[]);
        assert_eq!(cells.len(), 31);
        assert_eq!(cells[0].date, date(1));
        assert_eq!(cells[30].date, date(31));
    }

    #[test]
    fn month_cells_place_leaves_inclusively() {
        let leave = LeaveRequest {
            id: 1,
            user_id: 42,
            start_date: date(8),
            end_date: date(10),
            leave_type: LeaveType::Vacation,
            status: LeaveStatus::Pending,
            reason: String::new(),
            created_at: None,
        };
        let cells = build_month_cells(2024, 5, &[], &[leave], &[]);
        assert!(cells[6].leaves.is_empty()); // May 7
        assert_eq!(cells[7].leaves.len(), 1); // May 8
        assert_eq!(cells[9].leaves.len(), 1); // May 10
        assert!(cells[9].leaves[0].pending);
        assert!(cells[10].leaves.is_empty()); // May 11
    }

    #[test]
    fn rejected_and_cancelled_leaves_never_render() {
        let mut leave = LeaveRequest {
            id: 1,
            user_id: 42,
            start_date: date(8),
            end_date: date(8),
            leave_type: LeaveType::Personal,
            status: LeaveStatus::Rejected,
            reason: String::new(),
            created_at: None,
        };
        assert!(build_month_cells(2024, 5, &[], &[leave.clone()], &[])[7]
            .leaves
            .is_empty());
        leave.status = LeaveStatus::Cancelled;
        assert!(build_month_cells(2024, 5, &[], &[leave], &[])[7]
            .leaves
            .is_empty());
    }
}
