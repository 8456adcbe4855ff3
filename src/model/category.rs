use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Category {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "파레트")]
    pub name: String,
}
