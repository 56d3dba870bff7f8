use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use firelog_common::dto::meldunki::{
    CreateMeldunekRequest, ListMeldunkiQuery, MeldunekDto, Paginated, UpdateMeldunekRequest,
};
use firelog_common::envelope::{ApiResponse, MessageData};

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

use super::extract::{ApiJson, ApiQuery, parse_id};
use super::{ApiResult, ok};

/// `GET /api/meldunki`
pub async fn list_meldunki(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<ListMeldunkiQuery>,
) -> ApiResult<Paginated<MeldunekDto>> {
    Ok(ok(state.meldunki_service().list(&user.profile, &query).await?))
}

/// `POST /api/meldunki`
pub async fn create_meldunek(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateMeldunekRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MeldunekDto>>), AppError> {
    let dto = state.meldunki_service().create(&user.profile, req).await?;
    Ok((StatusCode::CREATED, ok(dto)))
}

/// `GET /api/meldunki/{id}`
pub async fn get_meldunek(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<MeldunekDto> {
    let id = parse_id(&id, "id")?;
    Ok(ok(state.meldunki_service().get(&user.profile, id).await?))
}

/// `PATCH /api/meldunki/{id}`
pub async fn update_meldunek(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateMeldunekRequest>,
) -> ApiResult<MeldunekDto> {
    let id = parse_id(&id, "id")?;
    let dto = state
        .meldunki_service()
        .update(&user.profile, id, &req)
        .await?;
    Ok(ok(dto))
}

/// `DELETE /api/meldunki/{id}`
pub async fn delete_meldunek(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<MessageData> {
    let id = parse_id(&id, "id")?;
    state.meldunki_service().delete(&user.profile, id).await?;
    Ok(ok(MessageData::new("Meldunek został usunięty")))
}

#[cfg(test)]
#[path = "meldunki_tests.rs"]
mod tests;
