use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use super::services::{compute_stats, AdminStats};
use crate::{
    early_access,
    error::AppResult,
    scan::UsageMeter,
    state::AppState,
    users::{AdminUser, User},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/stats", get(stats))
}

/// GET /admin/stats
#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    State(meter): State<UsageMeter>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<AdminStats>> {
    let store = state.store.as_ref();
    let users = User::list_all(store).await?;

    let mut usage = HashMap::with_capacity(users.len());
    for user in &users {
        if let Some(u) = meter.peek(user.id).await? {
            usage.insert(user.id, u);
        }
    }
    let signups = early_access::repo::list_all(store).await?.len();

    debug!(admin_id = %admin.id, users = users.len(), "computing admin stats");
    Ok(Json(compute_stats(&users, &usage, signups, meter.cap())))
}
