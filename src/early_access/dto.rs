use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub training_type: String,
    pub weight_class: Option<String>,
    #[serde(default)]
    pub goal: String,
}
