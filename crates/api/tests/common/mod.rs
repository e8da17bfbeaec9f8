#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vitafit_api::config::ServerConfig;
use vitafit_api::router::build_app_router;
use vitafit_api::state::AppState;
use vitafit_core::plan::DietOutcome;
use vitafit_core::session::SessionRecord;
use vitafit_core::types::Timestamp;
use vitafit_db::{MemorySessionStore, SessionStore, StoreError};
use vitafit_pipeline::assistant::{ChatAssistant, ChatMode};
use vitafit_pipeline::codec::{EncoderSet, LabelEncoder};
use vitafit_pipeline::detector::{DishDetector, RawDetection};
use vitafit_pipeline::error::ServiceError;
use vitafit_pipeline::forest::TreeEnsemble;
use vitafit_pipeline::report::PdfRenderer;
use vitafit_pipeline::{DietModels, ExerciseModels, ModelContext};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        max_upload_bytes: 64 * 1024,
        ..ServerConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Model fixtures
// ---------------------------------------------------------------------------

/// Single-leaf tree returning `value` for every row.
fn constant_tree(value: Vec<f64>) -> Value {
    json!({
        "children_left": [-1],
        "children_right": [-1],
        "feature": [-2],
        "threshold": [-2.0],
        "value": [value],
    })
}

fn constant_class(n_classes: usize, class: usize) -> Value {
    let mut dist = vec![0.0; n_classes];
    dist[class] = 1.0;
    json!({
        "kind": "classifier",
        "classes": (0..n_classes).map(|c| c as f64).collect::<Vec<_>>(),
        "trees": [constant_tree(dist)],
    })
}

fn ensemble(value: Value) -> TreeEnsemble {
    serde_json::from_value(value).expect("fixture ensemble is valid")
}

fn encoders(name: &'static str, fields: &[(&str, &[&str])]) -> EncoderSet {
    let map: BTreeMap<_, _> = fields
        .iter()
        .map(|(f, classes)| (f.to_string(), LabelEncoder::new(classes.iter().copied())))
        .collect();
    EncoderSet::new(name, map)
}

/// Exercise bundle: Female -> Cardio, anyone else -> Strength; always High
/// intensity five times a week, 40 minutes, 350 kcal.
pub fn exercise_models() -> ExerciseModels {
    let classifier = ensemble(json!({
        "n_features": 6,
        "estimators": [
            {
                "kind": "classifier",
                "classes": [0.0, 1.0],
                "trees": [{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [1, -2, -2],
                    "threshold": [0.5, -2.0, -2.0],
                    "value": [[], [1.0, 0.0], [0.0, 1.0]],
                }],
            },
            constant_class(3, 0),
            constant_class(3, 2),
        ],
    }));
    let regressor = ensemble(json!({
        "n_features": 6,
        "estimators": [
            { "kind": "regressor", "n_outputs": 2, "trees": [constant_tree(vec![40.0, 350.0])] },
        ],
    }));
    let encoders = encoders(
        "exercise",
        &[
            ("gender", &["Female", "Male", "Other"][..]),
            ("exercise_type", &["Cardio", "Strength"][..]),
            ("intensity_level", &["High", "Low", "Medium"][..]),
            ("frequency_per_week", &["2", "3", "5"][..]),
        ],
    );
    ExerciseModels::new(Box::new(classifier), Box::new(regressor), encoders)
        .expect("fixture exercise bundle is valid")
}

/// Diet bundle with a two-class gender encoder, so "Other" cannot be encoded.
pub fn diet_models() -> DietModels {
    let regressor = ensemble(json!({
        "n_features": 10,
        "estimators": [
            {
                "kind": "regressor",
                "n_outputs": 4,
                "trees": [constant_tree(vec![2100.0, 120.0, 250.0, 70.0])],
            },
        ],
    }));
    let encoders = encoders(
        "diet",
        &[
            ("gender", &["Male", "Female"][..]),
            ("exercise_type", &["Cardio", "Strength"][..]),
            ("intensity_level", &["High", "Low", "Medium"][..]),
            ("activity_level", &["light", "moderate", "sedentary", "very active"][..]),
        ],
    );
    DietModels::new(Box::new(regressor), encoders).expect("fixture diet bundle is valid")
}

pub fn full_models() -> ModelContext {
    ModelContext::new(Some(exercise_models()), Some(diet_models()))
}

// ---------------------------------------------------------------------------
// Collaborator stubs
// ---------------------------------------------------------------------------

pub struct StubDetector;

#[async_trait]
impl DishDetector for StubDetector {
    async fn detect(&self, _image: Vec<u8>, _filename: &str) -> Result<Vec<RawDetection>, ServiceError> {
        Ok(vec![
            RawDetection {
                class_name: "Burger".into(),
                confidence: 0.912,
                bbox: [12.2, 30.7, 200.4, 180.5],
            },
            RawDetection {
                class_name: "Pizza".into(),
                confidence: 0.05,
                bbox: [0.0, 0.0, 10.0, 10.0],
            },
        ])
    }
}

pub struct EchoAssistant;

#[async_trait]
impl ChatAssistant for EchoAssistant {
    async fn respond(
        &self,
        mode: ChatMode,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<String, ServiceError> {
        Ok(format!("{}:{}:{}", mode.path(), session_id.unwrap_or("-"), message))
    }
}

/// Reads from an in-memory store; every write and health check fails as if
/// the database connection pool were exhausted.
pub struct UnwritableStore {
    pub inner: Arc<MemorySessionStore>,
}

fn pool_timeout() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl SessionStore for UnwritableStore {
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.inner.find(session_id).await
    }

    async fn upsert(&self, _record: &SessionRecord) -> Result<(), StoreError> {
        Err(pool_timeout())
    }

    async fn set_diet(
        &self,
        _session_id: &str,
        _outcome: &DietOutcome,
        _at: Timestamp,
    ) -> Result<bool, StoreError> {
        Err(pool_timeout())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(pool_timeout())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// State over `store` with the given models and no collaborators.
pub fn state_with_store(models: ModelContext, store: Arc<dyn SessionStore>) -> AppState {
    AppState::new(test_config(), store, Arc::new(models), Arc::new(PdfRenderer::new()))
}

/// State over an in-memory store with the given models and no collaborators.
pub fn test_state(models: ModelContext) -> (AppState, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let state = state_with_store(models, store.clone() as Arc<dyn SessionStore>);
    (state, store)
}

/// Full application over a store that cannot be written to.
pub fn build_unwritable_app(inner: Arc<MemorySessionStore>) -> Router {
    build_app_router(state_with_store(full_models(), Arc::new(UnwritableStore { inner })))
}

/// Full application with fixture models and stub collaborators.
pub fn build_test_app() -> Router {
    let (state, _) = test_state(full_models());
    build_app_router(
        state
            .with_detector(Arc::new(StubDetector))
            .with_assistant(Arc::new(EchoAssistant)),
    )
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub fn sample_input(session_id: &str, gender: &str) -> Value {
    json!({
        "session_id": session_id,
        "age": 30,
        "gender": gender,
        "height_value": 180,
        "height_unit": "cm",
        "weight_value": 80,
        "weight_unit": "kg",
        "calories_intake": 2200,
    })
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub const BOUNDARY: &str = "vitafit-test-boundary";

/// Multipart body with a single file field.
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// 1x1 transparent PNG.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];
