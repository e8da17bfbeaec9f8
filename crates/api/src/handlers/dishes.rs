use axum::extract::{Multipart, State};
use axum::Json;
use vitafit_core::error::CoreError;
use vitafit_pipeline::detector::{summarize, validate_image, DetectionResponse};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /classify_dish
///
/// Accepts a multipart upload with the image in the `file` field and returns
/// the detected dishes, enriched from the dish catalog.
pub async fn classify_dish(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DetectionResponse>> {
    let detector = state.detector.clone().ok_or_else(|| {
        CoreError::Configuration("Dish detector is not configured.".into())
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }
    let (filename, bytes) = upload.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field '{FILE_FIELD}'"))
    })?;

    let (width, height) = validate_image(&bytes, state.config.max_upload_bytes)?;
    tracing::debug!(%filename, width, height, bytes = bytes.len(), "Dish image accepted");

    let raw = detector.detect(bytes.to_vec(), &filename).await?;
    let response = summarize(raw, state.config.detection_confidence);
    tracing::info!(detections = response.detections.len(), "Dish classification complete");

    Ok(Json(response))
}
