use firelog_common::dto::meldunki::{
    CreateMeldunekRequest, ListMeldunkiQuery, MeldunekDto, Paginated, UpdateMeldunekRequest,
};
use firelog_common::envelope::MessageData;

use super::http::Client;

/// `GET /api/meldunki`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn list(client: &Client, query: &ListMeldunkiQuery) -> anyhow::Result<Paginated<MeldunekDto>> {
    client.get_with_query("/api/meldunki", query)
}

/// `GET /api/meldunki/{id}`
///
/// # Errors
///
/// Transport failures or an `ApiError` (`MELDUNEK_NOT_FOUND`, `FORBIDDEN`).
pub fn get(client: &Client, id: &str) -> anyhow::Result<MeldunekDto> {
    client.get(&format!("/api/meldunki/{id}"))
}

/// `POST /api/meldunki`
///
/// # Errors
///
/// Transport failures or an `ApiError` (`VALIDATION_ERROR`, ...).
pub fn create(client: &Client, req: &CreateMeldunekRequest) -> anyhow::Result<MeldunekDto> {
    client.post("/api/meldunki", req)
}

/// `PATCH /api/meldunki/{id}`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn update(
    client: &Client,
    id: &str,
    req: &UpdateMeldunekRequest,
) -> anyhow::Result<MeldunekDto> {
    client.patch(&format!("/api/meldunki/{id}"), req)
}

/// `DELETE /api/meldunki/{id}`
///
/// # Errors
///
/// Transport failures or an `ApiError`.
pub fn delete(client: &Client, id: &str) -> anyhow::Result<MessageData> {
    client.delete(&format!("/api/meldunki/{id}"))
}
