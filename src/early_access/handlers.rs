use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::SignupRequest, repo, repo_types::EarlyAccessSignup};
use crate::{
    error::{AppError, AppResult},
    scan::UsageMeter,
    state::AppState,
    storage::keys,
    users::{services::is_valid_email, AdminUser, MaybeAuthUser},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/early-access", post(signup))
        .route("/admin/early-access", get(list_signups))
}

/// POST /early-access { email, training_type, weight_class?, goal }
///
/// Open to anonymous visitors. A signed-in caller is linked to the signup and
/// counted as having clicked early access. The click is recorded before the
/// signup is stored.
#[instrument(skip(state, meter, body))]
pub async fn signup(
    State(state): State<AppState>,
    State(meter): State<UsageMeter>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<EarlyAccessSignup>)> {
    let Json(body) = body?;
    let email = body.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!("early access with invalid email");
        return Err(AppError::validation("Valid email required"));
    }
    let training_type = body.training_type.trim().to_string();
    if training_type.is_empty() {
        return Err(AppError::validation("Select your discipline"));
    }
    let goal = body.goal.trim().to_string();
    if goal.is_empty() {
        return Err(AppError::validation("Select your goal"));
    }

    let signup = EarlyAccessSignup {
        id: Uuid::new_v4(),
        user_id,
        email,
        training_type,
        weight_class: body
            .weight_class
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty()),
        goal,
        created_at: state.clock.now(),
    };
    if let Some(user_id) = user_id {
        meter.mark_early_access_clicked(user_id).await?;
    }
    {
        let _guard = state.locks.lock(keys::EARLY_ACCESS).await;
        repo::append(state.store.as_ref(), &signup).await?;
    }
    info!(signup_id = %signup.id, user_id = ?user_id, "early access signup");
    Ok((StatusCode::CREATED, Json(signup)))
}

/// Newest first.
#[instrument(skip(state, _admin))]
pub async fn list_signups(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<EarlyAccessSignup>>> {
    let mut all = repo::list_all(state.store.as_ref()).await?;
    all.reverse();
    Ok(Json(all))
}
