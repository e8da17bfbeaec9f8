//! Integration tests for the assistant pass-through endpoints.

mod common;

use axum::http::StatusCode;
use common::{expect_json, post_json};
use serde_json::json;
use vitafit_api::router::build_app_router;

#[tokio::test]
async fn overview_and_chat_use_distinct_modes() {
    let app = common::build_test_app();

    let response = post_json(
        app.clone(),
        "/ai/overview",
        json!({"message": "summarize", "session_id": "s-9"}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["response"], "overview:s-9:summarize");

    let response = post_json(app, "/ai/chat", json!({"message": "how much protein?"})).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["response"], "chat:-:how much protein?");
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let response = post_json(common::build_test_app(), "/ai/chat", json!({"message": ""})).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unconfigured_assistant_is_a_configuration_error() {
    let (state, _) = common::test_state(common::full_models());
    let response = post_json(build_app_router(state), "/ai/chat", json!({"message": "hi"})).await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
}
