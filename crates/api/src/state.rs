use std::sync::Arc;

use vitafit_db::SessionStore;
use vitafit_pipeline::assistant::ChatAssistant;
use vitafit_pipeline::detector::DishDetector;
use vitafit_pipeline::report::ReportRenderer;
use vitafit_pipeline::{ModelContext, PredictionService};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Session record store.
    pub store: Arc<dyn SessionStore>,
    /// Models loaded at startup. Never mutated afterwards.
    pub models: Arc<ModelContext>,
    pub predictions: Arc<PredictionService>,
    pub renderer: Arc<dyn ReportRenderer>,
    /// Absent when `DISH_DETECTOR_URL` is unset.
    pub detector: Option<Arc<dyn DishDetector>>,
    /// Absent when `ASSISTANT_URL` is unset.
    pub assistant: Option<Arc<dyn ChatAssistant>>,
}

impl AppState {
    /// Wire the prediction service over `models` and `store`.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn SessionStore>,
        models: Arc<ModelContext>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        let predictions = Arc::new(PredictionService::new(Arc::clone(&models), Arc::clone(&store)));
        Self {
            config: Arc::new(config),
            store,
            models,
            predictions,
            renderer,
            detector: None,
            assistant: None,
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn DishDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_assistant(mut self, assistant: Arc<dyn ChatAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }
}
