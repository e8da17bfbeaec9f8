//! Handlers for the two-phase exercise -> diet prediction flow.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use vitafit_core::input::{validate_payload, DietPlanRequest, UserInput};
use vitafit_core::plan::{DietOutcome, ExercisePlan};
use vitafit_core::types::SessionId;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExerciseResponse {
    pub session_id: SessionId,
    pub exercise_plan: ExercisePlan,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DietResponse {
    pub session_id: SessionId,
    pub diet_plan: DietOutcome,
    pub message: &'static str,
}

/// POST /predict_exercise
///
/// Predict an exercise plan and store it as the session's record, replacing
/// any earlier record for the same session id.
pub async fn predict_exercise(
    State(state): State<AppState>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> AppResult<Json<ExerciseResponse>> {
    let Json(input) = payload?;
    validate_payload(&input)?;

    let session_id = input.session_id.clone();
    let exercise_plan = state.predictions.predict_exercise(input).await?;

    Ok(Json(ExerciseResponse {
        session_id,
        exercise_plan,
        message: "Exercise plan generated. You can now generate a diet plan with more details if desired.",
    }))
}

/// POST /predict_diet
///
/// Predict a diet plan for a session with a stored exercise plan. A failed
/// diet computation still answers 200; `diet_plan` then carries `{error}`.
pub async fn predict_diet(
    State(state): State<AppState>,
    payload: Result<Json<DietPlanRequest>, JsonRejection>,
) -> AppResult<Json<DietResponse>> {
    let Json(request) = payload?;
    validate_payload(&request)?;

    let diet_plan = state.predictions.predict_diet(&request.session_id).await?;
    let message = if diet_plan.is_plan() {
        "Diet plan generated successfully!"
    } else {
        "Diet plan could not be generated; the error was recorded for this session."
    };

    Ok(Json(DietResponse {
        session_id: request.session_id,
        diet_plan,
        message,
    }))
}
