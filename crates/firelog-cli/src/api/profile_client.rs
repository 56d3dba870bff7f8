use firelog_common::dto::profile::{ProfileDto, UpdateProfileRequest};

use super::http::Client;

/// `GET /api/profile`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn get_profile(client: &Client) -> anyhow::Result<ProfileDto> {
    client.get("/api/profile")
}

/// `PATCH /api/profile`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn update_profile(client: &Client, req: &UpdateProfileRequest) -> anyhow::Result<ProfileDto> {
    client.patch("/api/profile", req)
}
