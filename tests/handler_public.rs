mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use linkshelf::application::services::Caller;
use linkshelf::domain::entities::LinkPatch;
use serde_json::{Value, json};
use uuid::Uuid;

// ─── Public profile ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_public_listing_hides_inactive_links() {
    let (state, _rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["A", "B", "C"]).await;
    state
        .facade
        .update_link(
            &Caller { owner_id: owner },
            owner,
            links[1].id,
            LinkPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let server = TestServer::new(common::test_app(state)).unwrap();
    let response = server.get(&format!("/public/{owner}/links")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["title"], "A");
    assert_eq!(links[1]["title"], "C");
    assert!(links[0].get("clicks").is_none());
}

#[tokio::test]
async fn test_public_listing_of_unknown_owner_is_empty() {
    let (state, _rx) = common::create_test_state();
    let server = TestServer::new(common::test_app(state)).unwrap();

    let response = server
        .get(&format!("/public/{}/links", Uuid::new_v4()))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["links"].as_array().unwrap().is_empty());
}

// ─── Click reporting ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_click_without_body_is_recorded() {
    let (state, _rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["A"]).await;
    let server = TestServer::new(common::test_app(state.clone())).unwrap();

    let response = server
        .post(&format!("/public/links/{}/click", links[0].id))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"], "recorded");

    let collection = state
        .facade
        .list_links(&Caller { owner_id: owner }, owner)
        .await
        .unwrap();
    assert_eq!(collection.links[0].click_count, 1);
}

#[tokio::test]
async fn test_click_with_repeated_token_counts_once() {
    let (state, _rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["A"]).await;
    let server = TestServer::new(common::test_app(state.clone())).unwrap();
    let path = format!("/public/links/{}/click", links[0].id);

    let first: Value = server
        .post(&path)
        .json(&json!({ "dedupToken": "tap-1" }))
        .await
        .json();
    let second: Value = server
        .post(&path)
        .add_header("Idempotency-Key", "tap-1")
        .await
        .json();

    assert_eq!(first["outcome"], "recorded");
    assert_eq!(second["outcome"], "duplicate");

    let collection = state
        .facade
        .list_links(&Caller { owner_id: owner }, owner)
        .await
        .unwrap();
    assert_eq!(collection.links[0].click_count, 1);
}

#[tokio::test]
async fn test_click_on_unknown_link_is_not_found() {
    let (state, _rx) = common::create_test_state();
    let server = TestServer::new(common::test_app(state)).unwrap();

    let response = server
        .post(&format!("/public/links/{}/click", Uuid::new_v4()))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_click_with_invalid_body_is_bad_request() {
    let (state, _rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["A"]).await;
    let server = TestServer::new(common::test_app(state)).unwrap();

    let response = server
        .post(&format!("/public/links/{}/click", links[0].id))
        .text("{not json")
        .await;

    response.assert_status_bad_request();
}

// ─── Redirect ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_redirect_queues_click() {
    let (state, mut rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["Blog"]).await;
    let server = TestServer::new(common::test_app(state)).unwrap();

    let response = server.get(&format!("/go/{}", links[0].id)).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/blog");

    let queued = rx.try_recv().unwrap();
    assert_eq!(queued.link_id, links[0].id);
    assert!(queued.dedup_token.is_none());
}

#[tokio::test]
async fn test_redirect_and_direct_click_with_same_key_count_once() {
    let (state, mut rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["Shop"]).await;
    let server = TestServer::new(common::test_app(state.clone())).unwrap();

    server
        .get(&format!("/go/{}", links[0].id))
        .add_header("Idempotency-Key", "nav-7")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    let direct: Value = server
        .post(&format!("/public/links/{}/click", links[0].id))
        .json(&json!({ "dedupToken": "nav-7" }))
        .await
        .json();
    assert_eq!(direct["outcome"], "recorded");

    let queued = rx.try_recv().unwrap();
    assert_eq!(queued.dedup_token.as_deref(), Some("nav-7"));
    let outcome = state
        .facade
        .click_service()
        .record_click_at(queued.link_id, queued.dedup_token.as_deref(), queued.received_at)
        .await
        .unwrap();
    assert_eq!(outcome.as_str(), "duplicate");

    let collection = state
        .facade
        .list_links(&Caller { owner_id: owner }, owner)
        .await
        .unwrap();
    assert_eq!(collection.links[0].click_count, 1);
}

#[tokio::test]
async fn test_redirect_to_disabled_link_is_not_found() {
    let (state, mut rx) = common::create_test_state();
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["Hidden"]).await;
    state
        .facade
        .update_link(
            &Caller { owner_id: owner },
            owner,
            links[0].id,
            LinkPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let server = TestServer::new(common::test_app(state)).unwrap();

    let response = server.get(&format!("/go/{}", links[0].id)).await;

    response.assert_status_not_found();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_succeeds_when_queue_is_closed() {
    let (state, rx) = common::create_test_state();
    drop(rx);
    let owner = Uuid::new_v4();
    let links = common::seed_links(&state, owner, &["Blog"]).await;
    let server = TestServer::new(common::test_app(state)).unwrap();

    let response = server.get(&format!("/go/{}", links[0].id)).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
}
