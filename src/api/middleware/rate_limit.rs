//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Per-IP limiter on the client socket address.
pub type PeerIpLimit =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Per-IP limiter reading `X-Forwarded-For` / `X-Real-IP` / `Forwarded`.
pub type ProxiedIpLimit =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Visitor-facing limits: 20 requests per second, bursts of 100.
///
/// Public profile pages and click reporting are hit once per visitor action,
/// so the limit is looser than for owner endpoints.
pub fn public_layer() -> PeerIpLimit {
    build(PeerIpKeyExtractor, 20, 100)
}

/// Same as [`public_layer`] for deployments behind a trusted reverse proxy.
pub fn proxied_public_layer() -> ProxiedIpLimit {
    build(SmartIpKeyExtractor, 20, 100)
}

/// Owner-facing limits: 2 requests per second, bursts of 30.
pub fn owner_layer() -> PeerIpLimit {
    build(PeerIpKeyExtractor, 2, 30)
}

/// Same as [`owner_layer`] for deployments behind a trusted reverse proxy.
pub fn proxied_owner_layer() -> ProxiedIpLimit {
    build(SmartIpKeyExtractor, 2, 30)
}

/// Requests exceeding the quota receive `429 Too Many Requests`.
fn build<K>(
    key_extractor: K,
    per_second: u64,
    burst_size: u32,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(key_extractor)
            .finish()
            .expect("rate limit quota is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
