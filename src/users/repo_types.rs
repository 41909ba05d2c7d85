use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_CALORIE_TARGET: u32 = 2500;
pub const DEFAULT_PROTEIN_TARGET: u32 = 180;
pub const DEFAULT_CARBS_TARGET: u32 = 250;
pub const DEFAULT_FAT_TARGET: u32 = 70;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

/// User record as persisted under `user:{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,             // stored lowercase
    pub password_hash: String,     // demo hash, kept out of every response DTO
    pub name: String,
    pub role: Role,
    pub weight: Option<f64>,       // kg
    pub height: Option<f64>,       // cm
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub goal: Option<Goal>,
    pub daily_calorie_target: u32,
    pub protein_target: u32,
    pub carbs_target: u32,
    pub fat_target: u32,
    #[serde(default)]
    pub fighter_mode: bool,
    pub target_weight: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
