use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Stored per (user, date). The empty string is a real wire value meaning
/// "no status recorded"; it round-trips as `Unset`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    OffDay,
    Late,
    EarlyLeave,
    Scheduled,
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
}

impl AttendanceStatus {
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(AttendanceStatus::Unset)
    }

    /// OFF_DAY and ABSENT never carry hours.
    pub fn zeroes_hours(&self) -> bool {
        matches!(self, AttendanceStatus::OffDay | AttendanceStatus::Absent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2024-05-10", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "PRESENT", value_type = String)]
    pub status: AttendanceStatus,
    #[schema(example = 8.0)]
    pub work_hours: f64,
    #[schema(example = 1.5)]
    pub overtime_hours: f64,
}

/// Raw row shape; status is a VARCHAR in MySQL.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub user_id: u64,
    pub date: NaiveDate,
    pub status: String,
    pub work_hours: f64,
    pub overtime_hours: f64,
}

impl AttendanceRow {
    pub fn into_record(self) -> AttendanceRecord {
        AttendanceRecord {
            user_id: self.user_id,
            date: self.date,
            status: AttendanceStatus::from_db(&self.status),
            work_hours: self.work_hours,
            overtime_hours: self.overtime_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_strings() {
        assert_eq!(AttendanceStatus::from_db("OFF_DAY"), AttendanceStatus::OffDay);
        assert_eq!(AttendanceStatus::from_db(""), AttendanceStatus::Unset);
        assert_eq!(AttendanceStatus::from_db("garbage"), AttendanceStatus::Unset);
        assert_eq!(AttendanceStatus::EarlyLeave.to_string(), "EARLY_LEAVE");
    }

    #[test]
    fn off_day_and_absent_zero_hours() {
        assert!(AttendanceStatus::OffDay.zeroes_hours());
        assert!(AttendanceStatus::Absent.zeroes_hours());
        assert!(!AttendanceStatus::Present.zeroes_hours());
    }
}
