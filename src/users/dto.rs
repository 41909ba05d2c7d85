use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Goal, Role, Sex, User};

/// Session token payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
    pub iss: String, // issuer
    pub aud: String, // audience
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Profile,
}

/// Full profile without credentials.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub goal: Option<Goal>,
    pub daily_calorie_target: u32,
    pub protein_target: u32,
    pub carbs_target: u32,
    pub fat_target: u32,
    pub fighter_mode: bool,
    pub target_weight: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            weight: u.weight,
            height: u.height,
            age: u.age,
            sex: u.sex,
            goal: u.goal,
            daily_calorie_target: u.daily_calorie_target,
            protein_target: u.protein_target,
            carbs_target: u.carbs_target,
            fat_target: u.fat_target,
            fighter_mode: u.fighter_mode,
            target_weight: u.target_weight,
            created_at: u.created_at,
        }
    }
}

/// PUT /me body. Optional body-metrics that are absent get cleared; targets
/// that are absent or not positive fall back to the defaults.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub goal: Option<Goal>,
    pub daily_calorie_target: Option<f64>,
    pub protein_target: Option<f64>,
    pub carbs_target: Option<f64>,
    pub fat_target: Option<f64>,
    pub fighter_mode: Option<bool>,
    pub target_weight: Option<f64>,
}
