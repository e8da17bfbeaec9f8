use axum::routing::post;
use axum::Router;

use crate::handlers::dishes;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/classify_dish", post(dishes::classify_dish))
}
