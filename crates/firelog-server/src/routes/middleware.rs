use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::token::{bearer_token, hash_token};
use crate::error::AppError;
use crate::state::AppState;

/// General rate limit for authenticated requests, keyed `api:<sha256(token)>`.
///
/// Adds `X-RateLimit-*` headers to the response only if the handler did not
/// already set them. Requests without a bearer token pass through unmodified;
/// the public auth endpoints carry their own per-IP limits.
pub async fn general_rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Hash the token before moving `request` into `next.run()`.
    let key = bearer_token(request.headers()).map(|t| format!("api:{}", hash_token(t)));
    let Some(key) = key else {
        return next.run(request).await;
    };

    let rl = state.rate_limiter.check_policy(&key, state.limits.api);
    if !rl.allowed {
        tracing::warn!(
            retry_after_secs = rl.reset_after_secs,
            "general API rate limit exceeded"
        );
        return AppError::rate_limited(&rl).into_response();
    }
    let mut response = next.run(request).await;
    if !response.headers().contains_key("x-ratelimit-limit") {
        response
            .headers_mut()
            .extend(super::ip::rate_limit_headers(&rl));
    }
    response
}
