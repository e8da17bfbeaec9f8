//! Two-phase prediction flow.
//!
//! `predict_exercise` normalizes and encodes the submission, runs the
//! exercise models and upserts the session record. `predict_diet` reads that
//! record back, derives the diet-model features and stores the outcome on the
//! same record. A failed diet computation is stored as an error payload so
//! the session stays reportable.

use std::sync::Arc;

use chrono::Utc;
use vitafit_core::activity::infer_activity_level;
use vitafit_core::error::CoreError;
use vitafit_core::input::UserInput;
use vitafit_core::plan::{round2, CoreFeatures, DietOutcome, DietPlan, ExercisePlan};
use vitafit_core::session::SessionRecord;
use vitafit_core::units::normalize;
use vitafit_db::SessionStore;

use crate::artifacts::{DietModels, ExerciseModels, ModelContext};
use crate::error::ModelError;

const DIET_MODEL_UNAVAILABLE: &str = "Diet prediction model not available or not loaded.";

/// Runs predictions against the shared model context and session store.
#[derive(Clone)]
pub struct PredictionService {
    models: Arc<ModelContext>,
    store: Arc<dyn SessionStore>,
}

impl PredictionService {
    pub fn new(models: Arc<ModelContext>, store: Arc<dyn SessionStore>) -> Self {
        Self { models, store }
    }

    pub fn models(&self) -> &ModelContext {
        &self.models
    }

    /// Normalize units and encode gender with the exercise encoders.
    pub fn preprocess(models: &ExerciseModels, input: &UserInput) -> Result<CoreFeatures, CoreError> {
        let metrics = normalize(
            input.height_value,
            input.height_unit,
            input.weight_value,
            input.weight_unit,
        );
        let gender = models.encoders.encode("gender", &input.gender)?;
        Ok(CoreFeatures {
            age: input.age,
            gender,
            height: metrics.height_in,
            weight: metrics.weight_kg,
            bmi: metrics.bmi,
            calories_intake: input.calories_intake,
        })
    }

    /// Phase one: predict an exercise plan and (re)create the session record.
    pub async fn predict_exercise(&self, input: UserInput) -> Result<ExercisePlan, CoreError> {
        let models = self.models.exercise()?;
        let features = Self::preprocess(models, &input)?;
        let plan = run_exercise(models, &features).map_err(|e| {
            tracing::error!(session_id = %input.session_id, error = %e, "Exercise prediction failed");
            CoreError::Downstream(format!("Error during exercise prediction: {}", downstream_message(&e)))
        })?;

        let session_id = input.session_id.clone();
        let record = SessionRecord::from_exercise(input, features, plan.clone(), Utc::now());
        self.store.upsert(&record).await.map_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "Failed to store exercise predictions");
            CoreError::Downstream(format!("Failed to store exercise predictions in database: {e}"))
        })?;
        tracing::info!(
            session_id = %session_id,
            exercise_type = %plan.exercise_type,
            intensity_level = %plan.intensity_level,
            "Exercise predictions stored"
        );
        Ok(plan)
    }

    /// Phase two: predict a diet plan for a session that has an exercise
    /// prediction and store the outcome on its record.
    pub async fn predict_diet(&self, session_id: &str) -> Result<DietOutcome, CoreError> {
        let record = self.load_session(session_id).await?;
        let (features, plan) = match (&record.processed_features, &record.exercise_predictions) {
            (Some(features), Some(plan)) => (features, plan),
            _ => {
                return Err(CoreError::IncompleteState(
                    "Incomplete stored data for session. Cannot generate diet plan.".into(),
                ))
            }
        };

        let outcome = match self.models.diet() {
            None => {
                tracing::warn!(session_id, "Diet models not loaded; storing error payload");
                DietOutcome::failed(DIET_MODEL_UNAVAILABLE)
            }
            Some(diet) => match run_diet(diet, features, plan, record.raw_user_input.as_ref(), session_id) {
                Ok(plan) => DietOutcome::Plan(plan),
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "Diet prediction failed; storing error payload");
                    DietOutcome::failed(downstream_message(&e))
                }
            },
        };

        let updated = self
            .store
            .set_diet(session_id, &outcome, Utc::now())
            .await
            .map_err(|e| {
                tracing::error!(session_id, error = %e, "Failed to store diet predictions");
                CoreError::Downstream(format!("Failed to update diet predictions in database: {e}"))
            })?;
        if !updated {
            return Err(not_found(session_id));
        }
        tracing::info!(session_id, success = outcome.is_plan(), "Diet predictions stored");
        Ok(outcome)
    }

    /// Fetch the stored record for `session_id`.
    pub async fn load_session(&self, session_id: &str) -> Result<SessionRecord, CoreError> {
        self.store
            .find(session_id)
            .await
            .map_err(|e| {
                tracing::error!(session_id, error = %e, "Failed to read session");
                CoreError::Downstream(format!("Failed to read session from database: {e}"))
            })?
            .ok_or_else(|| not_found(session_id))
    }
}

fn not_found(session_id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Session",
        id: session_id.to_string(),
    }
}

/// Strip the variant prefix so stored and returned messages read naturally.
fn downstream_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(m)
        | CoreError::IncompleteState(m)
        | CoreError::Configuration(m)
        | CoreError::Downstream(m)
        | CoreError::Internal(m) => m.clone(),
        CoreError::NotFound { .. } => err.to_string(),
    }
}

fn model_error(err: ModelError) -> CoreError {
    CoreError::Downstream(err.to_string())
}

/// Classifier outputs are label codes carried as floats.
fn class_code(index: usize, value: f64) -> Result<u32, ModelError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(ModelError::InvalidCode { index, value })
    }
}

fn parse_frequency(label: &str) -> Result<u32, CoreError> {
    let value: f64 = label.trim().parse().map_err(|_| {
        CoreError::Downstream(format!("frequency_per_week label '{label}' is not a number"))
    })?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(CoreError::Downstream(format!(
            "frequency_per_week label '{label}' is not a whole number of sessions"
        )));
    }
    Ok(value as u32)
}

fn run_exercise(models: &ExerciseModels, features: &CoreFeatures) -> Result<ExercisePlan, CoreError> {
    let row = features.to_row();
    let classes = models.classifier.predict(&row).map_err(model_error)?;
    let regression = models.regressor.predict(&row).map_err(model_error)?;

    let codes = classes
        .iter()
        .enumerate()
        .map(|(i, v)| class_code(i, *v))
        .collect::<Result<Vec<_>, _>>()
        .map_err(model_error)?;

    let enc = &models.encoders;
    let exercise_type = enc.decode("exercise_type", codes[0])?.to_string();
    let intensity_level = enc.decode("intensity_level", codes[1])?.to_string();
    let frequency_per_week = parse_frequency(enc.decode("frequency_per_week", codes[2])?)?;

    Ok(ExercisePlan {
        exercise_type,
        intensity_level,
        frequency_per_week,
        duration_minutes: round2(regression[0]),
        estimated_calorie_burn: round2(regression[1]),
    })
}

/// Gender code for the diet model, re-encoded from the raw submission with
/// the diet encoders. Falls back to the exercise-encoded code when the diet
/// set has no gender encoder or the raw input was not stored.
fn diet_gender(
    diet: &DietModels,
    features: &CoreFeatures,
    raw: Option<&UserInput>,
    session_id: &str,
) -> Result<u32, CoreError> {
    match raw {
        Some(input) if diet.encoders.contains("gender") => diet.encoders.encode("gender", &input.gender),
        _ => {
            tracing::warn!(
                session_id,
                "No diet gender encoder or raw input; reusing exercise-encoded gender"
            );
            Ok(features.gender)
        }
    }
}

fn run_diet(
    diet: &DietModels,
    features: &CoreFeatures,
    plan: &ExercisePlan,
    raw: Option<&UserInput>,
    session_id: &str,
) -> Result<DietPlan, CoreError> {
    let activity = infer_activity_level(plan.frequency_per_week, &plan.intensity_level);
    tracing::debug!(session_id, activity_level = %activity, "Inferred activity level");

    let gender = diet_gender(diet, features, raw, session_id)?;
    let enc = &diet.encoders;
    let exercise_type = enc.encode("exercise_type", &plan.exercise_type)?;
    let intensity_level = enc.encode("intensity_level", &plan.intensity_level)?;
    let activity_level = enc.encode("activity_level", activity.as_str())?;

    let row = [
        f64::from(features.age),
        f64::from(gender),
        features.height,
        features.weight,
        features.bmi,
        f64::from(features.calories_intake),
        f64::from(exercise_type),
        f64::from(intensity_level),
        f64::from(plan.frequency_per_week),
        f64::from(activity_level),
    ];
    let out = diet.regressor.predict(&row).map_err(model_error)?;

    Ok(DietPlan {
        recommended_calories: round2(out[0]),
        protein_grams_per_day: round2(out[1]),
        carbs_grams_per_day: round2(out[2]),
        fats_grams_per_day: round2(out[3]),
    })
}
