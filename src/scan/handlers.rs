use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{ScanOutcome, UsageResponse, UPGRADE_PATH},
    meter::{Metered, UsageMeter},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::AuthUser,
    vision::handlers::{read_image_part, run_detection, MAX_IMAGE_BYTES},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
        .route("/scan/usage", get(get_usage))
        .route("/scan/early-access-click", post(early_access_click))
}

/// POST /scan (multipart, field `image`)
///
/// Over the weekly cap this is a no-op answered with `limit_reached`; the
/// upload is not inspected and nothing is counted.
#[instrument(skip(state, meter, mp))]
pub async fn scan(
    State(state): State<AppState>,
    State(meter): State<UsageMeter>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> AppResult<Json<ScanOutcome>> {
    let outcome = meter
        .metered(user_id, || async {
            let upload = read_image_part(mp).await?;
            Ok::<_, AppError>(run_detection(&state, &upload).await)
        })
        .await?;

    let cap = meter.cap();
    Ok(Json(match outcome {
        Metered::Granted { value, usage } => {
            info!(%user_id, count = usage.count, "scan counted");
            ScanOutcome::Scanned {
                results: value,
                usage: UsageResponse::new(usage, cap),
            }
        }
        Metered::Denied { usage } => ScanOutcome::LimitReached {
            usage: UsageResponse::new(usage, cap),
            upgrade_path: UPGRADE_PATH,
        },
    }))
}

#[instrument(skip(meter))]
pub async fn get_usage(
    State(meter): State<UsageMeter>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UsageResponse>> {
    let usage = meter.get_usage(user_id).await?;
    Ok(Json(UsageResponse::new(usage, meter.cap())))
}

#[instrument(skip(meter))]
pub async fn early_access_click(
    State(meter): State<UsageMeter>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UsageResponse>> {
    let usage = meter.mark_early_access_clicked(user_id).await?;
    Ok(Json(UsageResponse::new(usage, meter.cap())))
}
