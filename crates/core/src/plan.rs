//! Processed features and prediction results persisted on a session.

use serde::{Deserialize, Serialize};

/// Normalized, partially-encoded features shared by both prediction phases.
///
/// `gender` holds the code from the *exercise* encoder set; the diet phase
/// re-encodes from the raw string instead of trusting this value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreFeatures {
    pub age: u32,
    pub gender: u32,
    /// Height in inches.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    pub bmi: f64,
    pub calories_intake: u32,
}

impl CoreFeatures {
    /// Feature row in the column order the exercise models were trained on:
    /// age, gender, height, weight, bmi, calories_intake.
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            f64::from(self.age),
            f64::from(self.gender),
            self.height,
            self.weight,
            self.bmi,
            f64::from(self.calories_intake),
        ]
    }
}

/// Decoded output of the exercise models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub exercise_type: String,
    pub intensity_level: String,
    pub frequency_per_week: u32,
    pub duration_minutes: f64,
    pub estimated_calorie_burn: f64,
}

impl ExercisePlan {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("exercise_type", self.exercise_type.clone()),
            ("intensity_level", self.intensity_level.clone()),
            ("frequency_per_week", self.frequency_per_week.to_string()),
            ("duration_minutes", self.duration_minutes.to_string()),
            ("estimated_calorie_burn", self.estimated_calorie_burn.to_string()),
        ]
    }
}

/// Output of the diet regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlan {
    pub recommended_calories: f64,
    pub protein_grams_per_day: f64,
    pub carbs_grams_per_day: f64,
    pub fats_grams_per_day: f64,
}

impl DietPlan {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("recommended_calories", self.recommended_calories.to_string()),
            ("protein_grams_per_day", self.protein_grams_per_day.to_string()),
            ("carbs_grams_per_day", self.carbs_grams_per_day.to_string()),
            ("fats_grams_per_day", self.fats_grams_per_day.to_string()),
        ]
    }
}

/// What the diet phase stored: a plan, or an error payload kept in its place
/// so the session stays reportable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DietOutcome {
    Plan(DietPlan),
    Failed { error: String },
}

impl DietOutcome {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            error: format!("Could not generate diet plan due to internal error: {reason}"),
        }
    }

    pub fn is_plan(&self) -> bool {
        matches!(self, Self::Plan(_))
    }
}

/// Round to two decimal places, as model outputs are reported.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
