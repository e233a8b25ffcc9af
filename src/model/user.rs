use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public projection of a user, safe to embed in API responses.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserSummary {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "jane@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "Jane", value_type = Option<String>)]
    pub first_name: Option<String>,
    #[schema(example = "Doe", value_type = Option<String>)]
    pub last_name: Option<String>,
}
