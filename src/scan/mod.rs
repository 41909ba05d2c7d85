pub mod dto;
pub mod handlers;
pub mod meter;

use crate::state::AppState;
use axum::Router;

pub use meter::{Metered, ScanUsage, UsageMeter};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
