use bytes::Bytes;
use serde::Serialize;

use super::services::DetectedFood;

#[derive(Debug, Serialize)]
pub struct VisionResponse {
    pub results: Vec<DetectedFood>,
}

/// The `image` part of a multipart upload.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub body: Bytes,
}
