use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::repository::Profile;
use crate::state::AppState;

use super::token::bearer_token;

/// Caller resolved from `Authorization: Bearer <access token>`.
///
/// The token is checked with the identity provider on every request and the
/// matching profile is loaded from the repository.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub access_token: String,
    pub profile: Profile,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::debug!("missing bearer token");
            AppError::unauthorized()
        })?;
        let authenticated = state.auth_service().authenticate(token).await?;
        Ok(Self {
            access_token: authenticated.access_token,
            profile: authenticated.profile,
        })
    }
}
