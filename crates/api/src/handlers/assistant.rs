//! Pass-through handlers for the chat assistant.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use vitafit_core::error::CoreError;
use vitafit_core::input::{validate_payload, ChatRequest};
use vitafit_pipeline::assistant::ChatMode;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

async fn respond(
    state: AppState,
    mode: ChatMode,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(request) = payload?;
    validate_payload(&request)?;

    let assistant = state.assistant.clone().ok_or_else(|| {
        CoreError::Configuration("Chat assistant is not configured.".into())
    })?;
    let response = assistant
        .respond(mode, &request.message, request.session_id.as_deref())
        .await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /ai/overview
pub async fn overview(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    respond(state, ChatMode::Overview, payload).await
}

/// POST /ai/chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    respond(state, ChatMode::Chat, payload).await
}
