use firelog_common::dto::auth::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, SessionDto,
};
use firelog_common::envelope::MessageData;

use super::http::Client;

/// `POST /api/auth/register`
///
/// # Errors
///
/// Transport failures or an `ApiError` from the server.
pub fn register(client: &Client, req: &RegisterRequest) -> anyhow::Result<AuthResponse> {
    client.post("/api/auth/register", req)
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// Transport failures or an `ApiError` (`INVALID_CREDENTIALS`,
/// `RATE_LIMIT_EXCEEDED`, ...).
pub fn login(client: &Client, email: &str, password: &str) -> anyhow::Result<AuthResponse> {
    client.post(
        "/api/auth/login",
        &LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        },
    )
}

/// `POST /api/auth/refresh`
///
/// # Errors
///
/// Transport failures or an `ApiError` (`INVALID_REFRESH_TOKEN`, ...).
pub fn refresh(client: &Client, refresh_token: &str) -> anyhow::Result<SessionDto> {
    client.post(
        "/api/auth/refresh",
        &RefreshRequest {
            refresh_token: refresh_token.to_string(),
        },
    )
}

/// `POST /api/auth/logout` with the client's bearer token.
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn logout(client: &Client) -> anyhow::Result<MessageData> {
    client.post("/api/auth/logout", &serde_json::json!({}))
}
