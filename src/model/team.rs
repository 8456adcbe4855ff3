use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Team {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "1조")]
    pub name: String,
}

impl Team {
    /// Numeric "조" ordinal embedded in the team name, used for the display
    /// color token. "10조 야간" → 10. Names without digits get None.
    pub fn ordinal(&self) -> Option<u32> {
        ordinal_of(&self.name)
    }
}

pub fn ordinal_of(name: &str) -> Option<u32> {
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        // fall back to the first digit run anywhere in the name
        let mut run = String::new();
        for c in name.chars() {
            if c.is_ascii_digit() {
                run.push(c);
            } else if !run.is_empty() {
                break;
            }
        }
        if run.is_empty() {
            return None;
        }
        return run.parse().ok();
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_ordinal() {
        assert_eq!(ordinal_of("1조"), Some(1));
        assert_eq!(ordinal_of("12조"), Some(12));
    }

    #[test]
    fn parses_embedded_ordinal() {
        assert_eq!(ordinal_of("야간 3조"), Some(3));
    }

    #[test]
    fn no_digits_gives_none() {
        assert_eq!(ordinal_of("파레트"), None);
    }
}
