use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateMealRequest, DayQuery},
    repo,
    repo_types::Meal,
    services::{build_items, new_meal},
};
use crate::nutrition::services::MAX_GRAMS;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::keys,
    users::AuthUser,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", delete(delete_meal))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<Vec<Meal>>> {
    let date = q.date.unwrap_or_else(|| state.clock.today());
    let meals = repo::list_by_day(state.store.as_ref(), user_id, date).await?;
    Ok(Json(meals))
}

/// POST /meals { date?, name, items: [{ name, grams, calories?, protein?, carbs?, fat? }] }
#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateMealRequest>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Meal>)> {
    let Json(mut body) = body?;
    if body.items.iter().any(|i| i.grams.is_some_and(|g| g > MAX_GRAMS)) {
        warn!(%user_id, "meal item over gram cap");
        return Err(AppError::validation("grams must be at most 100000"));
    }
    let items = build_items(std::mem::take(&mut body.items));
    if items.is_empty() {
        warn!(%user_id, "meal without usable items");
        return Err(AppError::validation(
            "items must contain at least one food with a name and positive grams",
        ));
    }

    let meal = new_meal(user_id, state.clock.today(), state.clock.now(), body, items);
    {
        let _guard = state.locks.lock(&keys::meals(user_id, meal.date)).await;
        repo::insert(state.store.as_ref(), &meal).await?;
    }
    info!(%user_id, meal_id = %meal.id, date = %meal.date, items = meal.items.len(), "meal logged");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/meals?date={}", meal.date).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(meal)))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<DayQuery>,
) -> AppResult<StatusCode> {
    let date = q.date.unwrap_or_else(|| state.clock.today());
    let removed = {
        let _guard = state.locks.lock(&keys::meals(user_id, date)).await;
        repo::delete(state.store.as_ref(), user_id, date, id).await?
    };
    if !removed {
        return Err(AppError::not_found("Meal not found"));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}
