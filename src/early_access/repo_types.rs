use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Append-only waitlist entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarlyAccessSignup {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub training_type: String,
    pub weight_class: Option<String>,
    pub goal: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
