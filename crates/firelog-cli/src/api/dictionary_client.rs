use firelog_common::dto::dictionary::{CountyDto, FireDepartmentDto, ProvinceDto};

use super::http::Client;

/// `GET /api/provinces`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn provinces(client: &Client) -> anyhow::Result<Vec<ProvinceDto>> {
    client.get("/api/provinces")
}

/// `GET /api/provinces/{id}/counties`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn counties(client: &Client, province_id: &str) -> anyhow::Result<Vec<CountyDto>> {
    client.get(&format!("/api/provinces/{province_id}/counties"))
}

/// `GET /api/counties/{id}/fire-departments`
///
/// # Errors
///
/// Transport failures or an `ApiError` (`VALIDATION_ERROR` for a malformed id).
pub fn fire_departments(client: &Client, county_id: &str) -> anyhow::Result<Vec<FireDepartmentDto>> {
    client.get(&format!("/api/counties/{county_id}/fire-departments"))
}
