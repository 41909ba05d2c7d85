use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use tracing::{instrument, warn};

use super::{
    dto::NutritionSearchRequest,
    services::{resolve, Macros, MAX_GRAMS},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/nutrition/search", post(search))
}

/// POST /nutrition/search { name, grams }
#[instrument(skip(body))]
pub async fn search(
    body: Result<Json<NutritionSearchRequest>, JsonRejection>,
) -> AppResult<Json<Macros>> {
    let Json(body) = body?;

    let name = body.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        warn!("nutrition search without name");
        return Err(AppError::validation("name is required"));
    }
    let grams = match body.grams {
        Some(g) if g.is_finite() && g > 0.0 && g <= MAX_GRAMS => g,
        Some(g) if g > MAX_GRAMS => {
            warn!(grams = g, "nutrition search over gram cap");
            return Err(AppError::validation("grams must be at most 100000"));
        }
        _ => {
            warn!(grams = ?body.grams, "nutrition search with bad grams");
            return Err(AppError::validation("grams must be a positive number"));
        }
    };

    Ok(Json(resolve(name, grams)))
}
