//! Inference pipeline for the VitaFit service.
//!
//! Loads the frozen model artifacts into an immutable [`artifacts::ModelContext`],
//! runs the two-phase exercise → diet flow against a session store, builds and
//! renders reports, and talks to the external dish detector and assistant.

pub mod artifacts;
pub mod assistant;
pub mod codec;
pub mod detector;
pub mod error;
pub mod forest;
pub mod orchestrator;
pub mod report;

pub use artifacts::{DietModels, ExerciseModels, ModelContext};
pub use orchestrator::PredictionService;
