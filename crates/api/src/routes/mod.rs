pub mod assistant;
pub mod dishes;
pub mod health;
pub mod predictions;
pub mod reports;

use axum::Router;

use crate::state::AppState;

/// Build the route tree. All routes live at the root.
///
/// ```text
/// GET  /                     liveness message
/// GET  /health               service, store and model health
///
/// POST /predict_exercise     phase one: exercise plan
/// POST /predict_diet         phase two: diet plan
/// POST /generate_report      PDF report for a session
///
/// POST /classify_dish        multipart image -> detections
///
/// POST /ai/overview          assistant overview of a plan
/// POST /ai/chat              assistant free-form chat
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(predictions::router())
        .merge(reports::router())
        .merge(dishes::router())
        .nest("/ai", assistant::router())
}
