//! Assistant routes, mounted at `/ai`.

use axum::routing::post;
use axum::Router;

use crate::handlers::assistant;
use crate::state::AppState;

/// ```text
/// POST /overview -> overview
/// POST /chat     -> chat
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", post(assistant::overview))
        .route("/chat", post(assistant::chat))
}
