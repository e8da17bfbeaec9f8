//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use vitafit_api::error::AppError;
use vitafit_api::router::panic_response;
use vitafit_core::error::CoreError;
use vitafit_pipeline::error::{RenderError, ServiceError};

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Session",
        id: "abc".into(),
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Session with id abc not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) = error_to_response(CoreError::Validation("bad gender".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad gender");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("invalid field value".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn incomplete_state_returns_500_with_message() {
    let (status, json) =
        error_to_response(CoreError::IncompleteState("missing features".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INCOMPLETE_STATE");
    assert_eq!(json["error"], "missing features");
}

#[tokio::test]
async fn configuration_error_returns_500_with_message() {
    let (status, json) =
        error_to_response(CoreError::Configuration("models not loaded".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
    assert_eq!(json["error"], "models not loaded");
}

#[tokio::test]
async fn downstream_error_keeps_underlying_message() {
    let (status, json) =
        error_to_response(CoreError::Downstream("store unreachable".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DOWNSTREAM_ERROR");
    assert_eq!(json["error"], "store unreachable");
}

#[tokio::test]
async fn collaborator_failure_is_downstream() {
    let err = AppError::from(ServiceError::Api {
        status: 503,
        body: "busy".into(),
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DOWNSTREAM_ERROR");
    assert!(json["error"].as_str().unwrap().contains("busy"));
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    for err in [
        AppError::Core(CoreError::Internal("secret detail".into())),
        AppError::InternalError("secret detail".into()),
        AppError::Render(RenderError::Pdf("secret detail".into())),
    ] {
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }
}

async fn explode() -> &'static str {
    panic!("model exploded")
}

#[tokio::test]
async fn handler_panic_returns_internal_error_json() {
    let app = Router::new()
        .route("/boom", get(explode))
        .layer(CatchPanicLayer::custom(panic_response));

    let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
