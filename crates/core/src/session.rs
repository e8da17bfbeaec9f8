//! The per-session prediction record.

use serde::{Deserialize, Serialize};

use crate::input::UserInput;
use crate::plan::{CoreFeatures, DietOutcome, ExercisePlan};
use crate::types::{SessionId, Timestamp};

/// One stored document per session id.
///
/// Created by the exercise phase (upsert), extended in place by the diet
/// phase, read by reporting. Never deleted by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub timestamp: Timestamp,
    pub raw_user_input: Option<UserInput>,
    pub processed_features: Option<CoreFeatures>,
    pub exercise_predictions: Option<ExercisePlan>,
    pub diet_predictions: Option<DietOutcome>,
    pub last_updated: Option<Timestamp>,
}

/// Position of a session in the two-phase flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoSession,
    ExercisePredicted,
    DietPredicted,
}

impl SessionRecord {
    /// A fresh record as written by the exercise phase. Any previous diet
    /// result for the same session is cleared.
    pub fn from_exercise(
        input: UserInput,
        features: CoreFeatures,
        plan: ExercisePlan,
        now: Timestamp,
    ) -> Self {
        Self {
            session_id: input.session_id.clone(),
            timestamp: now,
            raw_user_input: Some(input),
            processed_features: Some(features),
            exercise_predictions: Some(plan),
            diet_predictions: None,
            last_updated: Some(now),
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.exercise_predictions, &self.diet_predictions) {
            (Some(_), Some(_)) => SessionState::DietPredicted,
            (Some(_), None) => SessionState::ExercisePredicted,
            (None, _) => SessionState::NoSession,
        }
    }
}
