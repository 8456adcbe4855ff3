use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "username": "hong.gd",
        "name": "홍길동",
        "role_id": 1,
        "is_approved": true,
        "company_id": 3,
        "hire_date": "2023-11-01",
        "car_number": "12가3456"
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "hong.gd")]
    pub username: String,

    #[schema(example = "홍길동")]
    pub name: String,

    /// 1 = worker, 2 = manager
    #[schema(example = 1)]
    pub role_id: u8,

    #[schema(example = true)]
    pub is_approved: bool,

    #[schema(example = 3, nullable = true)]
    pub company_id: Option<u64>,

    #[schema(example = "2023-11-01", value_type = String, format = "date", nullable = true)]
    pub hire_date: Option<NaiveDate>,

    #[schema(example = "12가3456", nullable = true)]
    pub car_number: Option<String>,
}
