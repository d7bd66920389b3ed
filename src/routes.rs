//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /health`  - Health check: storage, click queue (public)
//! - `/api/*`       - Owner REST API (Bearer token required)
//! - `/public/*`    - Profile listing and click reporting (public)
//! - `GET /go/{id}` - Tracked redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::api::routes::{owner_routes, public_routes};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads the client IP from
///   forwarding headers instead of the peer socket address; enable only when
///   the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let owner_router =
        owner_routes().route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let (owner_router, public_router) = if behind_proxy {
        (
            owner_router.layer(rate_limit::proxied_owner_layer()),
            public_routes().layer(rate_limit::proxied_public_layer()),
        )
    } else {
        (
            owner_router.layer(rate_limit::owner_layer()),
            public_routes().layer(rate_limit::public_layer()),
        )
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", owner_router)
        .merge(public_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
