use axum::routing::post;
use axum::Router;

use crate::handlers::predictions;
use crate::state::AppState;

/// ```text
/// POST /predict_exercise -> predict_exercise
/// POST /predict_diet     -> predict_diet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict_exercise", post(predictions::predict_exercise))
        .route("/predict_diet", post(predictions::predict_diet))
}
