use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use firelog_common::dto::auth::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, SessionDto,
};
use firelog_common::envelope::{ApiResponse, MessageData};

use crate::auth::token::bearer_token;
use crate::error::AppError;
use crate::rate_limit::{RateLimitPolicy, RateLimitResult};
use crate::state::AppState;

use super::extract::ApiJson;
use super::ip::{PeerIp, extract_ip, rate_limit_headers};
use super::{ApiResult, ok};

type Limited<T> = Result<(StatusCode, HeaderMap, Json<ApiResponse<T>>), AppError>;

/// Count one call against `<scope>:<client ip>`.
fn check_ip_limit(
    state: &AppState,
    headers: &HeaderMap,
    peer: Option<&str>,
    scope: &str,
    policy: RateLimitPolicy,
) -> Result<RateLimitResult, AppError> {
    let ip = extract_ip(headers, state.trust_proxy, peer);
    let rl = state.rate_limiter.check_policy(&format!("{scope}:{ip}"), policy);
    if !rl.allowed {
        tracing::warn!(scope, ip = %ip, "rate limit exceeded");
        return Err(AppError::rate_limited(&rl));
    }
    Ok(rl)
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// `RATE_LIMIT_EXCEEDED`, `VALIDATION_ERROR`, `FIRE_DEPARTMENT_NOT_FOUND`,
/// `INVALID_VERIFICATION_CODE` or `EMAIL_ALREADY_EXISTS`.
pub async fn register(
    State(state): State<AppState>,
    PeerIp(peer): PeerIp,
    headers: HeaderMap,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Limited<AuthResponse> {
    let rl = check_ip_limit(
        &state,
        &headers,
        peer.as_deref(),
        "register",
        state.limits.register,
    )?;
    let resp = state.auth_service().register(&req).await?;
    Ok((StatusCode::CREATED, rate_limit_headers(&rl), ok(resp)))
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// `RATE_LIMIT_EXCEEDED`, `VALIDATION_ERROR`, `INVALID_CREDENTIALS` or
/// `EMAIL_NOT_CONFIRMED`.
pub async fn login(
    State(state): State<AppState>,
    PeerIp(peer): PeerIp,
    headers: HeaderMap,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Limited<AuthResponse> {
    let rl = check_ip_limit(&state, &headers, peer.as_deref(), "login", state.limits.login)?;
    let resp = state.auth_service().login(&req).await?;
    tracing::info!(user_id = %resp.user.id, "user logged in");
    Ok((StatusCode::OK, rate_limit_headers(&rl), ok(resp)))
}

/// `POST /api/auth/refresh`
///
/// # Errors
///
/// `RATE_LIMIT_EXCEEDED`, `VALIDATION_ERROR` or `INVALID_REFRESH_TOKEN`.
pub async fn refresh(
    State(state): State<AppState>,
    PeerIp(peer): PeerIp,
    headers: HeaderMap,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Limited<SessionDto> {
    let rl = check_ip_limit(
        &state,
        &headers,
        peer.as_deref(),
        "refresh",
        state.limits.refresh,
    )?;
    let session = state.auth_service().refresh(&req).await?;
    Ok((StatusCode::OK, rate_limit_headers(&rl), ok(session)))
}

/// `POST /api/auth/logout`. Idempotent for tokens that are already dead.
///
/// # Errors
///
/// `UNAUTHORIZED` without a bearer token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<MessageData> {
    let token = bearer_token(&headers).ok_or_else(AppError::unauthorized)?;
    state.auth_service().logout(token).await?;
    Ok(ok(MessageData::new("Wylogowano pomyślnie")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use axum::http::{Method, StatusCode};
    use firelog_common::role::Role;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::rate_limit::RateLimitPolicy;
    use crate::routes::create_router;
    use crate::routes::test_helpers::*;

    #[tokio::test]
    async fn register_creates_member_profile() {
        init_test_tracing();
        let t = make_state();
        let app = create_router(t.state.clone());
        let resp = app
            .oneshot(send_json(
                Method::POST,
                "/api/auth/register",
                None,
                &register_body(&t.department, "nowy@osp.pl"),
            ))
            .await
            .unwrap();
        assert!(resp.headers().contains_key("x-ratelimit-remaining"));
        let json = json_body(&assert_status(resp, StatusCode::CREATED).await);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["profile"]["role"], "member");
        assert_eq!(json["data"]["profile"]["fire_department"]["name"], "OSP Demo");
        assert!(json["data"]["session"]["access_token"].is_string());
    }

    #[tokio::test]
    async fn register_with_wrong_code_is_rejected() {
        let t = make_state();
        let mut body = register_body(&t.department, "nowy@osp.pl");
        body["verification_code"] = json!("ZLYKOD");
        let resp = create_router(t.state.clone())
            .oneshot(send_json(Method::POST, "/api/auth/register", None, &body))
            .await
            .unwrap();
        let json = json_body(&assert_status(resp, StatusCode::BAD_REQUEST).await);
        assert_eq!(json["error"]["code"], "INVALID_VERIFICATION_CODE");
        assert_eq!(t.provider.user_count(), 0);
    }

    #[tokio::test]
    async fn register_reports_field_errors() {
        let t = make_state();
        let body = json!({ "email": "bez-malpy", "password": "krotkie" });
        let resp = create_router(t.state.clone())
            .oneshot(send_json(Method::POST, "/api/auth/register", None, &body))
            .await
            .unwrap();
        let json = json_body(&assert_status(resp, StatusCode::BAD_REQUEST).await);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert!(json["error"]["details"]["email"].is_string());
        assert!(json["error"]["details"]["password"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_json() {
        let t = make_state();
        let req = axum::http::Request::post("/api/auth/login")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{\"email\":"))
            .unwrap();
        let resp = create_router(t.state.clone()).oneshot(req).await.unwrap();
        let json = json_body(&assert_status(resp, StatusCode::BAD_REQUEST).await);
        assert_eq!(json["error"]["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let t = make_state();
        t.user("jan@osp.pl", Role::Member).await;
        let resp = create_router(t.state.clone())
            .oneshot(send_json(
                Method::POST,
                "/api/auth/login",
                None,
                &json!({ "email": "jan@osp.pl", "password": "Zle#Haslo99" }),
            ))
            .await
            .unwrap();
        let json = json_body(&assert_status(resp, StatusCode::UNAUTHORIZED).await);
        assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn login_is_rate_limited_per_ip() {
        let mut t = make_state();
        t.state.limits.login = RateLimitPolicy::new(2, 900);
        let app = create_router(t.state.clone());
        let body = json!({ "email": "jan@osp.pl", "password": "Zle#Haslo99" });
        for _ in 0..2 {
            let resp = app
                .clone()
                .oneshot(send_json(Method::POST, "/api/auth/login", None, &body))
                .await
                .unwrap();
            assert_status(resp, StatusCode::UNAUTHORIZED).await;
        }
        let resp = app
            .oneshot(send_json(Method::POST, "/api/auth/login", None, &body))
            .await
            .unwrap();
        let retry_after: u64 = resp.headers()["retry-after"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after > 0 && retry_after <= 900);
        let json = json_body(&assert_status(resp, StatusCode::TOO_MANY_REQUESTS).await);
        assert_eq!(json["error"]["code"], "RATE_LIMIT_EXCEEDED");
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_reuse() {
        let t = make_state();
        let session = t
            .state
            .auth_service()
            .register(&register_request(&t.department, "jan@osp.pl"))
            .await
            .unwrap()
            .session
            .unwrap();
        let app = create_router(t.state.clone());
        let body = json!({ "refresh_token": session.refresh_token });

        let resp = app
            .clone()
            .oneshot(send_json(Method::POST, "/api/auth/refresh", None, &body))
            .await
            .unwrap();
        let json = json_body(&assert_status(resp, StatusCode::OK).await);
        assert_ne!(json["data"]["access_token"], session.access_token.as_str());

        let resp = app
            .oneshot(send_json(Method::POST, "/api/auth/refresh", None, &body))
            .await
            .unwrap();
        let json = json_body(&assert_status(resp, StatusCode::UNAUTHORIZED).await);
        assert_eq!(json["error"]["code"], "INVALID_REFRESH_TOKEN");
    }

    #[tokio::test]
    async fn logout_revokes_token_and_is_idempotent() {
        let t = make_state();
        let (_, token) = t.user("jan@osp.pl", Role::Member).await;
        let app = create_router(t.state.clone());

        for _ in 0..2 {
            let resp = app
                .clone()
                .oneshot(send_json(Method::POST, "/api/auth/logout", Some(&token), &json!({})))
                .await
                .unwrap();
            assert_status(resp, StatusCode::OK).await;
        }
        let resp = app.clone().oneshot(get("/api/profile", Some(&token))).await.unwrap();
        assert_status(resp, StatusCode::UNAUTHORIZED).await;

        let resp = app
            .oneshot(send_json(Method::POST, "/api/auth/logout", None, &json!({})))
            .await
            .unwrap();
        assert_status(resp, StatusCode::UNAUTHORIZED).await;
    }
}
