use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};

use crate::rate_limit::RateLimitResult;

/// Axum extractor that resolves the TCP peer IP from `ConnectInfo<SocketAddr>`.
///
/// Returns `None` when `ConnectInfo` is unavailable (e.g. in tests that use
/// `Router::oneshot` without `into_make_service_with_connect_info`).
pub struct PeerIp(pub Option<String>);

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for PeerIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());
        Ok(Self(ip))
    }
}

/// Client IP used as the rate-limit key for the public auth endpoints.
///
/// With `trust_proxy` the first `X-Forwarded-For` entry wins. Otherwise, or
/// when the header is absent, the TCP peer address is used, and `"unknown"`
/// when there is none.
///
/// # Security
///
/// `X-Forwarded-For` is trivially spoofable. Enable `trust_proxy` only behind
/// a reverse proxy that overwrites the header.
pub fn extract_ip(headers: &HeaderMap, trust_proxy: bool, peer_ip: Option<&str>) -> String {
    if trust_proxy
        && let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    {
        return ip.to_string();
    }
    peer_ip.map_or_else(|| "unknown".to_string(), ToString::to_string)
}

/// Build `X-RateLimit-*` response headers from a [`RateLimitResult`].
pub fn rate_limit_headers(result: &RateLimitResult) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-limit", HeaderValue::from(result.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(result.reset_after_secs),
    );
    headers
}
