use serde::Deserialize;
use time::Date;

use super::services::Intensity;
use crate::clock::iso_date;

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub duration: Option<f64>,
    pub intensity: Intensity,
    pub notes: Option<String>,
}
