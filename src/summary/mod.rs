pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::{summarize, DaySummary};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
