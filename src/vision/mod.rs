pub mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::{detect, DetectedFood};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
