#![allow(dead_code)]

use axum::{Router, middleware};
use chrono::TimeDelta;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use linkshelf::api::middleware::auth;
use linkshelf::api::routes::{owner_routes, public_routes};
use linkshelf::application::QueryFacade;
use linkshelf::application::services::{
    AnalyticsSettings, AuthService, Caller, DEFAULT_DEDUP_WINDOW_SECONDS,
};
use linkshelf::domain::click_queue::QueuedClick;
use linkshelf::domain::entities::Link;
use linkshelf::infrastructure::memory::{MemoryClickRepository, MemoryLinkRepository};
use linkshelf::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use linkshelf::state::AppState;

pub const TEST_SECRET: &str = "test-signing-secret";

pub fn memory_facade() -> QueryFacade {
    QueryFacade::new(
        Arc::new(MemoryLinkRepository::new()),
        Arc::new(MemoryClickRepository::new()),
        TimeDelta::seconds(DEFAULT_DEDUP_WINDOW_SECONDS),
        AnalyticsSettings::default(),
    )
}

pub fn pg_facade(pool: PgPool) -> QueryFacade {
    let pool = Arc::new(pool);
    QueryFacade::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool)),
        TimeDelta::seconds(DEFAULT_DEDUP_WINDOW_SECONDS),
        AnalyticsSettings::default(),
    )
}

/// In-memory state; the receiver stands in for the click worker.
pub fn create_test_state() -> (AppState, mpsc::Receiver<QueuedClick>) {
    let (tx, rx) = mpsc::channel(100);
    let state = AppState::new(
        Arc::new(memory_facade()),
        Arc::new(AuthService::new(TEST_SECRET.to_string())),
        tx,
    );
    (state, rx)
}

/// Owner and public routes wired the way the server wires them, without rate limiting.
pub fn test_app(state: AppState) -> Router {
    let owner =
        owner_routes().route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .nest("/api", owner)
        .merge(public_routes())
        .with_state(state)
}

pub fn bearer(owner_id: Uuid) -> String {
    let token = AuthService::new(TEST_SECRET.to_string()).issue_token(owner_id);
    format!("Bearer {token}")
}

pub async fn seed_links(state: &AppState, owner_id: Uuid, titles: &[&str]) -> Vec<Link> {
    let caller = Caller { owner_id };
    let mut links = Vec::with_capacity(titles.len());
    for title in titles {
        let url = format!("https://example.com/{}", title.to_lowercase());
        links.push(
            state
                .facade
                .create_link(&caller, owner_id, title, &url, None)
                .await
                .unwrap(),
        );
    }
    links
}
