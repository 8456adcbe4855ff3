use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Free-text note for a date. Content may start with a bracketed status tag
/// ("[결근] 홍길동") picked up by the calendar grouping.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DailyLog {
    #[schema(example = 11)]
    pub id: u64,
    #[schema(example = "2024-05-10", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "[결근] 홍길동")]
    pub content: String,
    #[schema(example = "관리자")]
    pub author: String,
    #[schema(example = "2024-05-10T10:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
