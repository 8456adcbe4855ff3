use std::collections::HashSet;

use chrono::NaiveDate;
use derive_more::Display;
use serde::Serialize;

use crate::core::position::Position;
use crate::model::role::Role;
use crate::model::roster::RosterAssignment;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum EditError {
    #[display(fmt = "해당 날짜에 승인된 휴가가 있는 인원입니다")]
    OnLeave,
    #[display(fmt = "관리 포지션은 관리자만 배정할 수 있습니다")]
    ManagerOnly,
}

/// Day-roster save payload; the server replaces the date's assignment set
/// with exactly this.
#[derive(Debug, Serialize)]
pub struct RosterSave {
    pub date: NaiveDate,
    pub assignments: Vec<RosterAssignment>,
    pub palette_team_id: Option<u64>,
    pub cleaning_team_id: Option<u64>,
}

/// In-memory assignment list for one date, mutated slot by slot before an
/// explicit save. Keeps the roster invariants so a bad edit never reaches
/// the payload.
#[derive(Debug)]
pub struct RosterEditor {
    date: NaiveDate,
    assignments: Vec<RosterAssignment>,
    on_leave: HashSet<u64>,
    palette_team_id: Option<u64>,
    cleaning_team_id: Option<u64>,
}

impl RosterEditor {
    pub fn new(
        date: NaiveDate,
        existing: Vec<RosterAssignment>,
        on_leave: HashSet<u64>,
    ) -> Self {
        Self {
            date,
            assignments: existing,
            on_leave,
            palette_team_id: None,
            cleaning_team_id: None,
        }
    }

    pub fn assignments(&self) -> &[RosterAssignment] {
        &self.assignments
    }

    /// Place a user into a slot. A prior slot for the same user anywhere on
    /// the roster is dropped first, so this is a move, never a duplicate.
    pub fn add(
        &mut self,
        user_id: u64,
        user_name: Option<String>,
        role: Role,
        team: &str,
        position: Position,
    ) -> Result<(), EditError> {
        if self.on_leave.contains(&user_id) {
            return Err(EditError::OnLeave);
        }
        if position == Position::Management && role != Role::Manager {
            return Err(EditError::ManagerOnly);
        }

        self.assignments.retain(|a| a.user_id != user_id);
        self.assignments.push(RosterAssignment {
            user_id,
            user_name,
            team: team.to_string(),
            position,
        });
        Ok(())
    }

    /// Remove by (team, position, user). The position comes in raw because
    /// old rows still carry legacy aliases.
    pub fn remove(&mut self, team: &str, raw_position: &str, user_id: u64) {
        let position = Position::canonicalize(raw_position);
        self.assignments.retain(|a| {
            !(a.team == team && Some(a.position) == position && a.user_id == user_id)
        });
    }

    pub fn clear(&mut self) {
        self.assignments.clear();
    }

    pub fn set_special_teams(&mut self, palette: Option<u64>, cleaning: Option<u64>) {
        self.palette_team_id = palette;
        self.cleaning_team_id = cleaning;
    }

    pub fn into_save(self) -> RosterSave {
        RosterSave {
            date: self.date,
            assignments: self.assignments,
            palette_team_id: self.palette_team_id,
            cleaning_team_id: self.cleaning_team_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn editor() -> RosterEditor {
        RosterEditor::new(day(), Vec::new(), HashSet::new())
    }

    #[test]
    fn add_moves_rather_than_duplicates() {
        let mut ed = editor();
        ed.add(7, None, Role::Worker, "A조", Position::Inspection).unwrap();
        ed.add(7, None, Role::Worker, "B조", Position::Fork).unwrap();

        let slots: Vec<_> = ed
            .assignments()
            .iter()
            .filter(|a| a.user_id == 7)
            .collect();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].team, "B조");
        assert_eq!(slots[0].position, Position::Fork);
    }

    #[test]
    fn leave_blocked_add_mutates_nothing() {
        let mut ed = RosterEditor::new(day(), Vec::new(), HashSet::from([7]));
        assert_eq!(
            ed.add(7, None, Role::Worker, "1조", Position::Fork),
            Err(EditError::OnLeave)
        );
        assert!(ed.assignments().is_empty());
    }

    #[test]
    fn management_slot_requires_manager() {
        let mut ed = editor();
        assert_eq!(
            ed.add(3, None, Role::Worker, "1조", Position::Management),
            Err(EditError::ManagerOnly)
        );
        ed.add(4, None, Role::Manager, "1조", Position::Management).unwrap();
        assert_eq!(ed.assignments().len(), 1);
    }

    #[test]
    fn remove_matches_on_normalized_position() {
        let mut ed = editor();
        ed.add(7, None, Role::Worker, "1조", Position::Fork).unwrap();
        // caller still using the legacy alias
        ed.remove("1조", "지게차", 7);
        assert!(ed.assignments().is_empty());
    }

    #[test]
    fn remove_is_exact_on_team_and_user() {
        let mut ed = editor();
        ed.add(7, None, Role::Worker, "1조", Position::Fork).unwrap();
        ed.remove("2조", "포크", 7);
        ed.remove("1조", "포크", 8);
        assert_eq!(ed.assignments().len(), 1);
    }

    #[test]
    fn clear_then_save_replaces_with_empty_set() {
        let mut ed = editor();
        ed.add(1, None, Role::Worker, "1조", Position::Clamp).unwrap();
        ed.clear();
        ed.set_special_teams(Some(3), None);
        let save = ed.into_save();
        assert!(save.assignments.is_empty());
        assert_eq!(save.palette_team_id, Some(3));
        assert_eq!(save.date, day());
    }
}
