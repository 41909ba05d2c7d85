pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::{compute_stats, AdminStats};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
