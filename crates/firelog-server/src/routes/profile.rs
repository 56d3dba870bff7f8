use axum::extract::State;

use firelog_common::dto::profile::{ProfileDto, UpdateProfileRequest};

use crate::auth::extractor::AuthUser;
use crate::state::AppState;

use super::extract::ApiJson;
use super::{ApiResult, ok};

/// `GET /api/profile`
pub async fn get_profile(State(state): State<AppState>, user: AuthUser) -> ApiResult<ProfileDto> {
    Ok(ok(state.profile_service().get_own(&user.profile)))
}

/// `PATCH /api/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<ProfileDto> {
    let dto = state
        .profile_service()
        .update_own(&user.profile, &req)
        .await?;
    Ok(ok(dto))
}
