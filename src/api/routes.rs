//! API route configuration.
//!
//! Owner routes are mounted under `/api` and require a Bearer token via
//! [`crate::api::middleware::auth`]. Public routes need no authentication.

use crate::api::handlers::{
    analytics_handler, create_link_handler, delete_link_handler, link_analytics_handler,
    list_links_handler, public_links_handler, record_click_handler, redirect_handler,
    reorder_links_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// Routes operating on the authenticated owner's collection.
///
/// # Endpoints
///
/// - `GET    /links`                - List the collection with its version
/// - `POST   /links`                - Append a link
/// - `PUT    /links/order`          - Replace the ordering
/// - `PUT    /links/{id}`           - Update a link (same as PATCH)
/// - `PATCH  /links/{id}`           - Update a link
/// - `DELETE /links/{id}`           - Delete a link and compact positions
/// - `GET    /analytics`            - Collection click summary
/// - `GET    /analytics/link/{id}`  - Daily series of one link
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/order", put(reorder_links_handler))
        .route(
            "/links/{id}",
            put(update_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/analytics", get(analytics_handler))
        .route("/analytics/link/{id}", get(link_analytics_handler))
}

/// Visitor-facing routes.
///
/// # Endpoints
///
/// - `GET  /public/{owner_id}/links`  - Active links of a profile
/// - `POST /public/links/{id}/click`  - Report a click
/// - `GET  /go/{id}`                  - Redirect to the link target and count the click
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/{owner_id}/links", get(public_links_handler))
        .route("/public/links/{id}/click", post(record_click_handler))
        .route("/go/{id}", get(redirect_handler))
}
