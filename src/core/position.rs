use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Job slots within a team. Wire form is the Korean name. Two legacy aliases
/// (지게차, 상하차) still exist in old rows and incoming payloads; everything
/// past `canonicalize` sees only the canonical six.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Position {
    #[serde(rename = "검수")]
    #[strum(serialize = "검수")]
    Inspection,
    #[serde(rename = "포크")]
    #[strum(serialize = "포크")]
    Fork,
    #[serde(rename = "클램프")]
    #[strum(serialize = "클램프")]
    Clamp,
    #[serde(rename = "상하역")]
    #[strum(serialize = "상하역")]
    Loading,
    #[serde(rename = "OP")]
    #[strum(serialize = "OP")]
    Op,
    #[serde(rename = "관리")]
    #[strum(serialize = "관리")]
    Management,
}

/// A team of four or more must cover each of these.
pub const REQUIRED_POSITIONS: [Position; 4] = [
    Position::Inspection,
    Position::Fork,
    Position::Clamp,
    Position::Loading,
];

impl Position {
    /// Single normalization point for legacy aliases; applied wherever raw
    /// position strings enter the core.
    pub fn canonicalize(raw: &str) -> Option<Position> {
        let name = match raw.trim() {
            "지게차" => "포크",
            "상하차" => "상하역",
            other => other,
        };
        name.parse().ok()
    }

    pub fn is_required(&self) -> bool {
        REQUIRED_POSITIONS.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_parse() {
        assert_eq!(Position::canonicalize("검수"), Some(Position::Inspection));
        assert_eq!(Position::canonicalize("OP"), Some(Position::Op));
        assert_eq!(Position::canonicalize("관리"), Some(Position::Management));
    }

    #[test]
    fn legacy_aliases_normalize() {
        assert_eq!(Position::canonicalize("지게차"), Some(Position::Fork));
        assert_eq!(Position::canonicalize("상하차"), Some(Position::Loading));
        assert_eq!(Position::canonicalize(" 지게차 "), Some(Position::Fork));
    }

    #[test]
    fn unknown_position_is_rejected() {
        assert_eq!(Position::canonicalize("용접"), None);
    }

    #[test]
    fn wire_form_is_korean() {
        assert_eq!(Position::Fork.to_string(), "포크");
        assert_eq!(Position::Loading.to_string(), "상하역");
    }
}
