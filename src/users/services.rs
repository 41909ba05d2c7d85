pub(crate) use crate::users::dto::{Claims, JwtKeys};
use crate::config::JwtConfig;
use crate::error::AppError;
use crate::hash::hash_str;
use crate::state::AppState;
use crate::users::repo_types::{
    Goal, Role, User, DEFAULT_CALORIE_TARGET, DEFAULT_CARBS_TARGET, DEFAULT_FAT_TARGET,
    DEFAULT_PROTEIN_TARGET,
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::UpdateProfileRequest;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Demo-only password digest built on the shared string hash. Offers no
/// protection against anyone who can read the store.
pub fn hash_password(plain: &str) -> String {
    format!("demo_{:x}_{}", hash_str(plain), plain.chars().count())
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    hash_password(plain) == hash
}

/// Fresh user with default nutrition targets. `admin_email` gets the admin role.
pub fn new_user(name: &str, email: &str, password: &str, admin_email: &str, now: OffsetDateTime) -> User {
    let email = email.trim().to_lowercase();
    let role = if email == admin_email { Role::Admin } else { Role::User };
    User {
        id: Uuid::new_v4(),
        email,
        password_hash: hash_password(password),
        name: name.trim().to_string(),
        role,
        weight: None,
        height: None,
        age: None,
        sex: None,
        goal: Some(Goal::Maintain),
        daily_calorie_target: DEFAULT_CALORIE_TARGET,
        protein_target: DEFAULT_PROTEIN_TARGET,
        carbs_target: DEFAULT_CARBS_TARGET,
        fat_target: DEFAULT_FAT_TARGET,
        fighter_mode: false,
        target_weight: None,
        created_at: now,
    }
}

pub fn apply_profile_update(user: &mut User, req: UpdateProfileRequest) {
    fn target(v: Option<f64>, default: u32) -> u32 {
        match v {
            Some(t) if t.is_finite() && t >= 1.0 => t.round() as u32,
            _ => default,
        }
    }

    if let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        user.name = name.to_string();
    }
    user.weight = req.weight.filter(|w| *w > 0.0);
    user.height = req.height.filter(|h| *h > 0.0);
    user.age = req.age.filter(|a| *a > 0);
    user.sex = req.sex;
    user.goal = req.goal;
    user.daily_calorie_target = target(req.daily_calorie_target, DEFAULT_CALORIE_TARGET);
    user.protein_target = target(req.protein_target, DEFAULT_PROTEIN_TARGET);
    user.carbs_target = target(req.carbs_target, DEFAULT_CARBS_TARGET);
    user.fat_target = target(req.fat_target, DEFAULT_FAT_TARGET);
    if let Some(f) = req.fighter_mode {
        user.fighter_mode = f;
    }
    user.target_weight = req.target_weight.filter(|w| *w > 0.0);
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes.max(1) as u64) * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

/// Caller identity taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(AppError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

/// Caller that may be anonymous. No `Authorization` header yields `None`; a
/// header that is present must carry a valid token.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        Ok(MaybeAuthUser(Some(user_id)))
    }
}

/// Authenticated caller whose record carries the admin role.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = User::find_by_id(state.store.as_ref(), user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
        if !user.is_admin() {
            warn!(%user_id, "non-admin hit admin route");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use std::sync::Arc;

    fn keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake(Arc::new(SystemClock)))
    }

    #[test]
    fn demo_hash_roundtrip() {
        let hash = hash_password("correct-horse");
        assert!(hash.starts_with("demo_"));
        assert!(hash.ends_with("_13"));
        assert!(verify_password("correct-horse", &hash));
        assert!(!verify_password("correct-horsf", &hash));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("fighter@gym.io"));
        assert!(!is_valid_email("fighter@gym"));
        assert!(!is_valid_email("fighter gym@x.io"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn admin_email_gets_admin_role() {
        let now = OffsetDateTime::now_utc();
        let admin = new_user("Boss", " Admin@Goatrition.com ", "password1", "admin@goatrition.com", now);
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.email, "admin@goatrition.com");
        let user = new_user("Kid", "kid@x.io", "password1", "admin@goatrition.com", now);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.daily_calorie_target, 2500);
        assert_eq!(user.goal, Some(Goal::Maintain));
    }

    #[test]
    fn profile_update_defaults_bad_targets() {
        let mut user = new_user("Kid", "kid@x.io", "password1", "admin@x.io", OffsetDateTime::now_utc());
        apply_profile_update(
            &mut user,
            UpdateProfileRequest {
                name: Some("  ".into()),
                weight: Some(77.5),
                height: None,
                age: Some(24),
                sex: None,
                goal: Some(Goal::Lose),
                daily_calorie_target: Some(2100.0),
                protein_target: Some(0.0),
                carbs_target: None,
                fat_target: Some(-3.0),
                fighter_mode: Some(true),
                target_weight: Some(70.0),
            },
        );
        assert_eq!(user.name, "Kid");
        assert_eq!(user.weight, Some(77.5));
        assert_eq!(user.daily_calorie_target, 2100);
        assert_eq!(user.protein_target, 180);
        assert_eq!(user.carbs_target, 250);
        assert_eq!(user.fat_target, 70);
        assert!(user.fighter_mode);
    }

    #[test]
    fn sign_and_verify_token() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test");
    }

    #[test]
    fn verify_rejects_foreign_token() {
        let mut other = AppState::fake(Arc::new(SystemClock));
        let mut config = (*other.config).clone();
        config.jwt.secret = "other-secret".into();
        other.config = Arc::new(config);
        let token = JwtKeys::from_ref(&other).sign(Uuid::new_v4()).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut req = axum::http::Request::builder().uri("/early-access");
        if let Some(value) = authorization {
            req = req.header(axum::http::header::AUTHORIZATION, value);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn optional_caller_is_anonymous_only_without_header() {
        let state = AppState::fake(Arc::new(SystemClock));
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_ref(&state).sign(user_id).unwrap();

        let MaybeAuthUser(none) = MaybeAuthUser::from_request_parts(&mut parts(None), &state)
            .await
            .unwrap();
        assert_eq!(none, None);

        let bearer = format!("Bearer {token}");
        let MaybeAuthUser(some) = MaybeAuthUser::from_request_parts(&mut parts(Some(&bearer)), &state)
            .await
            .unwrap();
        assert_eq!(some, Some(user_id));

        let rejected = MaybeAuthUser::from_request_parts(&mut parts(Some("Bearer expired.or.forged")), &state).await;
        assert!(matches!(rejected, Err(AppError::Unauthorized(_))));
    }
}
