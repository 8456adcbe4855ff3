use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::position::Position;
use crate::model::team::Team;

/// One (user, team, position) slot on a date's roster. Positions are
/// canonicalized at ingestion; legacy aliases never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RosterAssignment {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "홍길동", nullable = true)]
    pub user_name: Option<String>,
    #[schema(example = "1조")]
    pub team: String,
    #[schema(example = "포크", value_type = String)]
    pub position: Position,
}

/// Raw row shape; position is a VARCHAR and may still hold a legacy alias.
#[derive(Debug, sqlx::FromRow)]
pub struct RosterAssignmentRow {
    pub user_id: u64,
    pub team: String,
    pub position: String,
}

impl RosterAssignmentRow {
    /// None for rows whose position string is unrecognized even after alias
    /// normalization; callers drop those rows.
    pub fn into_assignment(self) -> Option<RosterAssignment> {
        Some(RosterAssignment {
            user_id: self.user_id,
            user_name: None,
            team: self.team,
            position: Position::canonicalize(&self.position)?,
        })
    }
}

/// A full day: assignment set plus the optional special crews.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Roster {
    #[schema(example = "2024-05-10", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub assignments: Vec<RosterAssignment>,
    pub palette_team: Option<Team>,
    pub cleaning_team: Option<Team>,
}
