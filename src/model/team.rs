use serde::{Deserialize, Serialize};

/// Teams are collaborator-owned reference data; this service only reads
/// them to scope KPI aggregates. Membership lives in `team_members`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}
