use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use vitafit_core::input::{validate_payload, ReportRequest};
use vitafit_pipeline::report::{build_report, report_filename};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /generate_report
///
/// Render the session's stored predictions as a downloadable PDF.
pub async fn generate_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload?;
    validate_payload(&request)?;

    let record = state.predictions.load_session(&request.session_id).await?;
    let document = build_report(&record, request.user_details.as_ref());
    // PDF layout is CPU-bound.
    let renderer = Arc::clone(&state.renderer);
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|e| AppError::InternalError(format!("Report rendering task failed: {e}")))??;

    let filename = report_filename(&request.session_id, chrono::Utc::now().date_naive());
    tracing::info!(session_id = %request.session_id, bytes = bytes.len(), "Report generated");

    Ok((
        [
            (CONTENT_TYPE, state.renderer.content_type().to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    ))
}
