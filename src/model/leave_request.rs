use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    CancellationPending,
}

impl LeaveStatus {
    /// PENDING → APPROVED | REJECTED
    /// APPROVED → CANCELLATION_PENDING
    /// CANCELLATION_PENDING → CANCELLED | APPROVED (cancellation denied)
    pub fn can_transition(self, to: LeaveStatus) -> bool {
        use LeaveStatus::*;
        matches!(
            (self, to),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, CancellationPending)
                | (CancellationPending, Cancelled)
                | (CancellationPending, Approved)
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    FamilyEvent,
    Sick,
    Other,
    Vacation,
    Personal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2024-05-08", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-05-10", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "SICK", value_type = String)]
    pub leave_type: LeaveType,
    #[schema(example = "PENDING", value_type = String)]
    pub status: LeaveStatus,
    #[schema(example = "병원 진료")]
    pub reason: String,
    #[schema(example = "2024-05-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Inclusive calendar-date containment, time of day already stripped.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Raw row shape; enum columns are VARCHARs in MySQL.
#[derive(Debug, sqlx::FromRow)]
pub struct LeaveRow {
    pub id: u64,
    pub user_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub status: String,
    pub reason: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRow {
    pub fn into_request(self) -> Option<LeaveRequest> {
        Some(LeaveRequest {
            id: self.id,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
            leave_type: self.leave_type.parse().ok()?,
            status: self.status.parse().ok()?,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use LeaveStatus::*;
        assert!(Pending.can_transition(Approved));
        assert!(Pending.can_transition(Rejected));
        assert!(Approved.can_transition(CancellationPending));
        assert!(CancellationPending.can_transition(Cancelled));
        assert!(CancellationPending.can_transition(Approved));
    }

    #[test]
    fn illegal_transitions() {
        use LeaveStatus::*;
        assert!(!Approved.can_transition(Pending));
        assert!(!Rejected.can_transition(Approved));
        assert!(!Cancelled.can_transition(Pending));
        assert!(!Pending.can_transition(Cancelled));
    }

    #[test]
    fn covers_is_inclusive() {
        let leave = LeaveRequest {
            id: 1,
            user_id: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            leave_type: LeaveType::Sick,
            status: LeaveStatus::Approved,
            reason: String::new(),
            created_at: None,
        };
        assert!(leave.covers(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()));
        assert!(leave.covers(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()));
        assert!(!leave.covers(NaiveDate::from_ymd_opt(2024, 5, 11).unwrap()));
    }
}
