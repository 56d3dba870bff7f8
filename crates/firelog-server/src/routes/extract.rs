//! Extractors that report failures in the response envelope instead of
//! axum's plain-text rejections.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::AppError;

/// `Json<T>` whose rejections become `INVALID_JSON` or `VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Self(value))
            .map_err(json_rejection)
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    tracing::debug!("rejected request body: {}", rejection.body_text());
    match rejection {
        // Well-formed JSON of the wrong shape: a missing field or wrong type.
        JsonRejection::JsonDataError(e) => AppError::invalid_field("body", e.body_text()),
        other => AppError::invalid_json(format!(
            "Nieprawidłowy format JSON: {}",
            other.body_text()
        )),
    }
}

/// `Query<T>` whose rejections become `VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| {
                AppError::invalid_field("query", rejection.body_text())
            })
    }
}

/// Parse a path segment as a UUID.
///
/// # Errors
///
/// `VALIDATION_ERROR` naming `field` when the segment is not a UUID.
pub fn parse_id(raw: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_field(field, "Nieprawidłowy identyfikator"))
}
