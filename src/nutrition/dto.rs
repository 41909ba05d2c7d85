use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NutritionSearchRequest {
    pub name: Option<String>,
    pub grams: Option<f64>,
}
