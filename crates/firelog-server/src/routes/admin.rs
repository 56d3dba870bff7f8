use axum::extract::{Path, State};

use firelog_common::dto::admin::ChangeRoleRequest;
use firelog_common::dto::profile::ProfileDto;
use firelog_common::envelope::MessageData;

use crate::auth::extractor::AuthUser;
use crate::state::AppState;

use super::extract::{ApiJson, parse_id};
use super::{ApiResult, ok};

/// `GET /api/admin/users`
pub async fn list_users(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<ProfileDto>> {
    Ok(ok(state
        .admin_service()
        .list_department_users(&user.profile)
        .await?))
}

/// `PATCH /api/admin/users/{id}/role`
pub async fn change_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ChangeRoleRequest>,
) -> ApiResult<ProfileDto> {
    let target = parse_id(&id, "id")?;
    let dto = state
        .admin_service()
        .change_role(&user.profile, target, &req)
        .await?;
    Ok(ok(dto))
}

/// `DELETE /api/admin/users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<MessageData> {
    let target = parse_id(&id, "id")?;
    state
        .admin_service()
        .delete_user(&user.profile, target)
        .await?;
    Ok(ok(MessageData::new("Użytkownik został usunięty")))
}
