use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    #[schema(example = 5)]
    pub id: u64,
    #[schema(example = "파레트 11형")]
    pub name: String,
    #[schema(example = 2, nullable = true)]
    pub category_id: Option<u64>,
    #[schema(example = "PLT-11", nullable = true)]
    pub sku: Option<String>,
    #[schema(example = "EA", nullable = true)]
    pub unit: Option<String>,
}
