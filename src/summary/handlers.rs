use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::services::{summarize, DaySummary};
use crate::{
    activities, error::AppResult, meals, meals::dto::DayQuery, state::AppState,
    users::{handlers::load_user, AuthUser},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/summary", get(day_summary))
}

#[instrument(skip(state))]
pub async fn day_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<DaySummary>> {
    let date = q.date.unwrap_or_else(|| state.clock.today());
    let user = load_user(&state, user_id).await?;
    let meals = meals::repo::list_by_day(state.store.as_ref(), user_id, date).await?;
    let acts = activities::repo::list_by_day(state.store.as_ref(), user_id, date).await?;
    Ok(Json(summarize(date, &user, &meals, &acts)))
}
