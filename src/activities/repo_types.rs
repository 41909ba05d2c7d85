use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::services::Intensity;
use crate::clock::iso_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(rename = "type")]
    pub kind: String,
    /// Minutes.
    pub duration: f64,
    pub intensity: Intensity,
    pub calories_burned: u32,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
