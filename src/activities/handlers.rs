use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::CreateActivityRequest,
    repo,
    repo_types::Activity,
    services::{calories_burned, ACTIVITY_TYPES, DEFAULT_WEIGHT_KG, MAX_DURATION_MINUTES},
};
use crate::{
    error::{AppError, AppResult},
    meals::dto::DayQuery,
    state::AppState,
    storage::keys,
    users::{handlers::load_user, AuthUser},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(list_activities).post(create_activity))
        .route("/activities/types", get(list_types))
        .route("/activities/:id", delete(delete_activity))
}

pub async fn list_types() -> Json<Vec<&'static str>> {
    Json(ACTIVITY_TYPES.to_vec())
}

#[instrument(skip(state))]
pub async fn list_activities(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<Vec<Activity>>> {
    let date = q.date.unwrap_or_else(|| state.clock.today());
    Ok(Json(repo::list_by_day(state.store.as_ref(), user_id, date).await?))
}

/// POST /activities { date?, type, duration, intensity, notes? }
#[instrument(skip(state, body))]
pub async fn create_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateActivityRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Activity>)> {
    let Json(body) = body?;
    let kind = body.kind.trim().to_string();
    if kind.is_empty() {
        return Err(AppError::validation("type is required"));
    }
    let duration = match body.duration {
        Some(d) if d.is_finite() && d > 0.0 && d <= MAX_DURATION_MINUTES => d,
        Some(d) if d > MAX_DURATION_MINUTES => {
            warn!(%user_id, duration = d, "activity longer than a day");
            return Err(AppError::validation("duration must be at most 1440 minutes"));
        }
        _ => {
            warn!(%user_id, duration = ?body.duration, "bad activity duration");
            return Err(AppError::validation("duration must be a positive number of minutes"));
        }
    };

    let weight = load_user(&state, user_id).await?.weight.unwrap_or(DEFAULT_WEIGHT_KG);
    let activity = Activity {
        id: Uuid::new_v4(),
        user_id,
        date: body.date.unwrap_or_else(|| state.clock.today()),
        calories_burned: calories_burned(&kind, duration, body.intensity, weight),
        kind,
        duration,
        intensity: body.intensity,
        notes: body.notes.filter(|n| !n.trim().is_empty()),
        created_at: state.clock.now(),
    };
    {
        let _guard = state.locks.lock(&keys::activities(user_id, activity.date)).await;
        repo::insert(state.store.as_ref(), &activity).await?;
    }
    info!(%user_id, activity_id = %activity.id, kcal = activity.calories_burned, "activity logged");
    Ok((StatusCode::CREATED, Json(activity)))
}

#[instrument(skip(state))]
pub async fn delete_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<DayQuery>,
) -> AppResult<StatusCode> {
    let date = q.date.unwrap_or_else(|| state.clock.today());
    let removed = {
        let _guard = state.locks.lock(&keys::activities(user_id, date)).await;
        repo::delete(state.store.as_ref(), user_id, date, id).await?
    };
    if !removed {
        return Err(AppError::not_found("Activity not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
