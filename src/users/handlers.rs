use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::keys,
    users::{
        dto::{AuthResponse, LoginRequest, Profile, RegisterRequest, UpdateProfileRequest},
        repo_types::User,
        services::{apply_profile_update, is_valid_email, new_user, verify_password, AuthUser, JwtKeys},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let email = payload.email.trim().to_lowercase();

    if payload.name.trim().chars().count() < 2 {
        warn!("name too short");
        return Err(AppError::validation("Name must be at least 2 characters"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Valid email required"));
    }
    if payload.password.chars().count() < 8 {
        warn!("password too short");
        return Err(AppError::validation("Password must be at least 8 characters"));
    }

    let user = {
        let _guard = state.locks.lock(keys::USERS).await;
        if User::find_by_email(state.store.as_ref(), &email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::Conflict("Email already in use".into()));
        }
        let user = new_user(
            &payload.name,
            &email,
            &payload.password,
            &state.config.admin_email,
            state.clock.now(),
        );
        User::create(state.store.as_ref(), &user).await?;
        user
    };

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(payload) = payload?;
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let user = match User::find_by_email(state.store.as_ref(), &payload.email).await? {
        Some(u) if verify_password(&payload.password, &u.password_hash) => u,
        Some(u) => {
            warn!(user_id = %u.id, "login invalid password");
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
        None => {
            warn!("login unknown email");
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
    };

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Profile>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<Profile>> {
    let Json(payload) = payload?;
    let _guard = state.locks.lock(&keys::user(user_id)).await;
    let mut user = load_user(&state, user_id).await?;
    apply_profile_update(&mut user, payload);
    User::update(state.store.as_ref(), &user).await?;
    info!(%user_id, "profile updated");
    Ok(Json(user.into()))
}

/// Record behind a valid token; a missing record means the session is dead.
pub(crate) async fn load_user(state: &AppState, user_id: uuid::Uuid) -> AppResult<User> {
    User::find_by_id(state.store.as_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}
