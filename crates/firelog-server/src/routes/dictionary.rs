use axum::extract::{Path, State};

use firelog_common::dto::dictionary::{CountyDto, FireDepartmentDto, ProvinceDto};

use crate::state::AppState;

use super::extract::parse_id;
use super::{ApiResult, ok};

/// `GET /api/provinces`
pub async fn provinces(State(state): State<AppState>) -> ApiResult<Vec<ProvinceDto>> {
    Ok(ok(state.dictionary_service().provinces().await?))
}

/// `GET /api/provinces/{id}/counties`
pub async fn counties(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<CountyDto>> {
    let province_id = parse_id(&id, "province_id")?;
    Ok(ok(state.dictionary_service().counties(province_id).await?))
}

/// `GET /api/counties/{id}/fire-departments`
pub async fn fire_departments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<FireDepartmentDto>> {
    let county_id = parse_id(&id, "county_id")?;
    Ok(ok(state
        .dictionary_service()
        .fire_departments(county_id)
        .await?))
}
