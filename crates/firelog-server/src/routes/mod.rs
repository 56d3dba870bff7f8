mod admin;
mod auth;
mod dictionary;
pub mod extract;
mod health;
pub mod ip;
mod meldunki;
pub mod middleware;
mod profile;
mod ready;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use firelog_common::envelope::ApiResponse;
use firelog_common::error_code::ErrorCode;

use crate::error::AppError;
use crate::state::AppState;

/// Handler result carrying a success envelope.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub(crate) const fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

async fn not_found() -> AppError {
    AppError::not_found(ErrorCode::NotFound, "Nie znaleziono zasobu")
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route(
            "/meldunki",
            get(meldunki::list_meldunki).post(meldunki::create_meldunek),
        )
        .route(
            "/meldunki/{id}",
            get(meldunki::get_meldunek)
                .patch(meldunki::update_meldunek)
                .delete(meldunki::delete_meldunek),
        )
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/role", patch(admin::change_role))
        .route("/admin/users/{id}", axum::routing::delete(admin::delete_user))
        .route("/provinces", get(dictionary::provinces))
        .route("/provinces/{id}/counties", get(dictionary::counties))
        .route(
            "/counties/{id}/fire-departments",
            get(dictionary::fire_departments),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(ready::ready))
        .nest("/api", api)
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::general_rate_limit,
        ))
        .with_state(state)
}
