use std::time::Duration;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, error, instrument, warn};

use super::{
    dto::{ImageUpload, VisionResponse},
    services::{detect, detection_seed, is_supported_image, DetectedFood},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vision", post(vision))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
}

/// POST /vision (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn vision(
    State(state): State<AppState>,
    mp: Multipart,
) -> AppResult<Json<VisionResponse>> {
    let upload = read_image_part(mp).await?;
    let results = run_detection(&state, &upload).await;
    Ok(Json(VisionResponse { results }))
}

/// Pulls the first `image` part out of the form.
pub(crate) async fn read_image_part(mut mp: Multipart) -> AppResult<ImageUpload> {
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        if let Some(ct) = field.content_type() {
            if !is_supported_image(ct) {
                warn!(content_type = %ct, "unsupported image type");
                return Err(AppError::validation(
                    "Please upload a JPG, PNG, or WebP image.",
                ));
            }
        }
        let file_name = field.file_name().map(str::to_string);
        let body = field.bytes().await.map_err(multipart_error)?;
        // a plain form value stands in for the file name
        let file_name = file_name.or_else(|| Some(String::from_utf8_lossy(&body).into_owned()));
        return Ok(ImageUpload { file_name, body });
    }
    warn!("vision request without image part");
    Err(AppError::validation("No image provided"))
}

/// Simulated model latency followed by the deterministic guess.
pub(crate) async fn run_detection(state: &AppState, upload: &ImageUpload) -> Vec<DetectedFood> {
    let latency = state.config.scan.latency_ms;
    if latency > 0 {
        tokio::time::sleep(Duration::from_millis(latency)).await;
    }
    let seed = detection_seed(upload.file_name.as_deref(), state.clock.now());
    let results = detect(&seed);
    debug!(%seed, bytes = upload.body.len(), detected = results.len(), "mock detection");
    results
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::validation("Image must be under 5MB.");
    }
    error!(error = %e, "multipart read failed");
    AppError::Transport("Failed to process image".into())
}
