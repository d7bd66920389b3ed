mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use linkshelf::api::handlers::health_handler;
use serde_json::Value;

#[tokio::test]
async fn test_health_ok() {
    let (state, _rx) = common::create_test_state();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["storage"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_degraded_when_worker_gone() {
    let (state, rx) = common::create_test_state();
    drop(rx);
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["click_queue"]["status"], "error");
}
