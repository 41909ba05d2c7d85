use serde::Deserialize;
use time::Date;

use crate::clock::iso_date;

/// `?date=YYYY-MM-DD`, today when absent.
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct NewFoodItem {
    #[serde(default)]
    pub name: String,
    pub grams: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<NewFoodItem>,
}
