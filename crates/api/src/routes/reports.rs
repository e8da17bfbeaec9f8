use axum::routing::post;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate_report", post(reports::generate_report))
}
