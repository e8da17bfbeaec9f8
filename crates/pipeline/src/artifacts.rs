//! Model artifact bundles and the immutable model context.
//!
//! Artifacts are read once at startup into a [`ModelContext`] that is shared
//! read-only by every request. A bundle that fails to load is logged and left
//! absent; requests that need it fail with a configuration error (exercise)
//! or record a diet error payload (diet).

use std::fmt;
use std::path::Path;

use vitafit_core::error::CoreError;

use crate::codec::EncoderSet;
use crate::error::ArtifactError;
use crate::forest::{TabularModel, TreeEnsemble};

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

pub const EXERCISE_CLASSIFIER_FILE: &str = "multi_classifier.json";
pub const EXERCISE_REGRESSOR_FILE: &str = "multi_regressor.json";
pub const EXERCISE_ENCODERS_FILE: &str = "label_encoders.json";
pub const DIET_REGRESSOR_FILE: &str = "diet_model_rf.json";
pub const DIET_ENCODERS_FILE: &str = "diet_label_encoders.json";

// ---------------------------------------------------------------------------
// Frozen training schema
// ---------------------------------------------------------------------------

/// Column order the exercise models were trained on.
pub const EXERCISE_FEATURES: [&str; 6] = ["age", "gender", "height", "weight", "bmi", "calories_intake"];

/// Column order the diet model was trained on. `frequency_per_week` is a raw
/// number here, not an encoded category.
pub const DIET_FEATURES: [&str; 10] = [
    "age",
    "gender",
    "height",
    "weight",
    "bmi",
    "calories_intake",
    "exercise_type",
    "intensity_level",
    "frequency_per_week",
    "activity_level",
];

/// Classifier outputs, in order.
pub const EXERCISE_CLASS_TARGETS: [&str; 3] = ["exercise_type", "intensity_level", "frequency_per_week"];
/// Regressor outputs, in order.
pub const EXERCISE_REGRESSION_TARGETS: [&str; 2] = ["duration_minutes", "estimated_calorie_burn"];
/// Diet regressor outputs, in order.
pub const DIET_TARGETS: [&str; 4] = [
    "recommended_calories",
    "protein_grams_per_day",
    "carbs_grams_per_day",
    "fats_grams_per_day",
];

const EXERCISE_REQUIRED_ENCODERS: [&str; 4] =
    ["gender", "exercise_type", "intensity_level", "frequency_per_week"];
const DIET_REQUIRED_ENCODERS: [&str; 3] = ["exercise_type", "intensity_level", "activity_level"];

fn check_shape(
    name: &str,
    model: &dyn TabularModel,
    n_features: usize,
    n_outputs: usize,
) -> Result<(), ArtifactError> {
    if model.n_features() != n_features || model.n_outputs() != n_outputs {
        return Err(ArtifactError::Invalid(format!(
            "{name} maps {} features to {} outputs, expected {n_features} to {n_outputs}",
            model.n_features(),
            model.n_outputs()
        )));
    }
    Ok(())
}

fn shape(model: &dyn TabularModel) -> String {
    format!("{} -> {}", model.n_features(), model.n_outputs())
}

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

/// Exercise classifier, regressor, and their encoders.
pub struct ExerciseModels {
    pub classifier: Box<dyn TabularModel>,
    pub regressor: Box<dyn TabularModel>,
    pub encoders: EncoderSet,
}

impl ExerciseModels {
    /// Assemble a bundle, checking model shapes and required encoders.
    pub fn new(
        classifier: Box<dyn TabularModel>,
        regressor: Box<dyn TabularModel>,
        encoders: EncoderSet,
    ) -> Result<Self, ArtifactError> {
        check_shape(
            "exercise classifier",
            classifier.as_ref(),
            EXERCISE_FEATURES.len(),
            EXERCISE_CLASS_TARGETS.len(),
        )?;
        check_shape(
            "exercise regressor",
            regressor.as_ref(),
            EXERCISE_FEATURES.len(),
            EXERCISE_REGRESSION_TARGETS.len(),
        )?;
        encoders.require(&EXERCISE_REQUIRED_ENCODERS)?;
        Ok(Self {
            classifier,
            regressor,
            encoders,
        })
    }

    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let classifier = TreeEnsemble::load(&dir.join(EXERCISE_CLASSIFIER_FILE))?;
        let regressor = TreeEnsemble::load(&dir.join(EXERCISE_REGRESSOR_FILE))?;
        let encoders = EncoderSet::load("exercise", &dir.join(EXERCISE_ENCODERS_FILE))?;
        Self::new(Box::new(classifier), Box::new(regressor), encoders)
    }
}

impl fmt::Debug for ExerciseModels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseModels")
            .field("classifier", &shape(self.classifier.as_ref()))
            .field("regressor", &shape(self.regressor.as_ref()))
            .field("encoders", &self.encoders)
            .finish()
    }
}

/// Diet regressor and its encoders.
pub struct DietModels {
    pub regressor: Box<dyn TabularModel>,
    pub encoders: EncoderSet,
}

impl DietModels {
    pub fn new(regressor: Box<dyn TabularModel>, encoders: EncoderSet) -> Result<Self, ArtifactError> {
        check_shape(
            "diet regressor",
            regressor.as_ref(),
            DIET_FEATURES.len(),
            DIET_TARGETS.len(),
        )?;
        encoders.require(&DIET_REQUIRED_ENCODERS)?;
        Ok(Self {
            regressor,
            encoders,
        })
    }

    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let regressor = TreeEnsemble::load(&dir.join(DIET_REGRESSOR_FILE))?;
        let encoders = EncoderSet::load("diet", &dir.join(DIET_ENCODERS_FILE))?;
        Self::new(Box::new(regressor), encoders)
    }
}

impl fmt::Debug for DietModels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DietModels")
            .field("regressor", &shape(self.regressor.as_ref()))
            .field("encoders", &self.encoders)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Every model and encoder the service uses, built once at startup.
#[derive(Debug)]
pub struct ModelContext {
    exercise: Option<ExerciseModels>,
    diet: Option<DietModels>,
}

impl ModelContext {
    pub fn new(exercise: Option<ExerciseModels>, diet: Option<DietModels>) -> Self {
        Self { exercise, diet }
    }

    /// Load both bundles from their directories, logging any failure.
    pub fn load(exercise_dir: &Path, diet_dir: &Path) -> Self {
        let exercise = match ExerciseModels::load(exercise_dir) {
            Ok(models) => {
                tracing::info!(dir = %exercise_dir.display(), "Exercise models and encoders loaded");
                Some(models)
            }
            Err(e) => {
                tracing::error!(dir = %exercise_dir.display(), error = %e, "Failed to load exercise models");
                None
            }
        };
        let diet = match DietModels::load(diet_dir) {
            Ok(models) => {
                tracing::info!(dir = %diet_dir.display(), "Diet model and encoders loaded");
                Some(models)
            }
            Err(e) => {
                tracing::error!(dir = %diet_dir.display(), error = %e, "Failed to load diet models");
                None
            }
        };
        Self::new(exercise, diet)
    }

    /// The exercise bundle, or a configuration error if it never loaded.
    pub fn exercise(&self) -> Result<&ExerciseModels, CoreError> {
        self.exercise.as_ref().ok_or_else(|| {
            CoreError::Configuration(
                "Exercise models are not loaded. Server might be misconfigured.".into(),
            )
        })
    }

    pub fn diet(&self) -> Option<&DietModels> {
        self.diet.as_ref()
    }

    pub fn exercise_loaded(&self) -> bool {
        self.exercise.is_some()
    }

    pub fn diet_loaded(&self) -> bool {
        self.diet.is_some()
    }
}
