//! Request payloads accepted by the prediction endpoints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::SessionId;
use crate::units::{HeightUnit, WeightUnit};

/// Biometric input for the exercise phase, stored verbatim as
/// `raw_user_input` on the session record.
///
/// Gender is deliberately a free string: membership is checked against the
/// encoder class list so the error can name the allowed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserInput {
    #[validate(custom(function = "not_blank"))]
    pub session_id: SessionId,
    #[validate(range(min = 1, max = 119, message = "age must be between 1 and 119"))]
    pub age: u32,
    pub gender: String,
    #[validate(range(exclusive_min = 0.0, message = "height_value must be positive"))]
    pub height_value: f64,
    pub height_unit: HeightUnit,
    #[validate(range(exclusive_min = 0.0, message = "weight_value must be positive"))]
    pub weight_value: f64,
    pub weight_unit: WeightUnit,
    #[validate(range(min = 1, message = "calories_intake must be positive"))]
    pub calories_intake: u32,
}

impl UserInput {
    /// Labeled rows in submission order, for report rendering.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("session_id", self.session_id.clone()),
            ("age", self.age.to_string()),
            ("gender", self.gender.clone()),
            ("height_value", self.height_value.to_string()),
            ("height_unit", self.height_unit.as_str().to_string()),
            ("weight_value", self.weight_value.to_string()),
            ("weight_unit", self.weight_unit.as_str().to_string()),
            ("calories_intake", self.calories_intake.to_string()),
        ]
    }
}

/// Body of `POST /predict_diet`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DietPlanRequest {
    #[validate(custom(function = "not_blank"))]
    pub session_id: SessionId,
}

/// Optional personal details printed at the top of a report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPersonalDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserPersonalDetails {
    /// Present, non-empty fields as `(label, value)` pairs.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        [
            ("First Name", &self.first_name),
            ("Last Name", &self.last_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (label, v.to_string()))
        })
        .collect()
    }
}

/// Body of `POST /generate_report`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(custom(function = "not_blank"))]
    pub session_id: SessionId,
    pub user_details: Option<UserPersonalDetails>,
}

/// Body of the assistant endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    pub session_id: Option<SessionId>,
}

/// Session ids are opaque client strings, but must contain something other
/// than whitespace.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("session_id must not be blank".into()));
    }
    Ok(())
}

/// Run `validator` rules and flatten failures into a [`CoreError::Validation`].
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), CoreError> {
    payload
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}
