use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use firelog_common::envelope::{ApiResponse, FieldErrors};
use firelog_common::error_code::ErrorCode;

use crate::rate_limit::RateLimitResult;

#[derive(Debug)]
pub enum AppError {
    /// Logged server-side; the client only sees a generic message.
    Internal(String),
    Validation(FieldErrors),
    BadRequest(ErrorCode, String),
    Unauthorized(ErrorCode, String),
    Forbidden(ErrorCode, String),
    NotFound(ErrorCode, String),
    Conflict(ErrorCode, String),
    RateLimited {
        retry_after_secs: u64,
        limit: u32,
        remaining: u32,
    },
}

impl AppError {
    /// Construct a `RateLimited` error from a denied [`RateLimitResult`].
    pub const fn rate_limited(result: &RateLimitResult) -> Self {
        Self::RateLimited {
            retry_after_secs: result.reset_after_secs,
            limit: result.limit,
            remaining: result.remaining,
        }
    }

    /// Missing, malformed or rejected bearer token.
    pub fn unauthorized() -> Self {
        Self::Unauthorized(ErrorCode::Unauthorized, "Brak autoryzacji".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(ErrorCode::Forbidden, message.into())
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound(code, message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::BadRequest(ErrorCode::InvalidJson, message.into())
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        Self::Validation(errors)
    }

    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::RateLimited { .. } => ErrorCode::RateLimitExceeded,
            Self::BadRequest(code, _)
            | Self::Unauthorized(code, _)
            | Self::Forbidden(code, _)
            | Self::NotFound(code, _)
            | Self::Conflict(code, _) => *code,
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(..) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(..) => StatusCode::FORBIDDEN,
            Self::NotFound(..) => StatusCode::NOT_FOUND,
            Self::Conflict(..) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Validation(errors) => write!(f, "validation failed: {} field(s)", errors.len()),
            Self::BadRequest(code, msg) => write!(f, "bad request ({code}): {msg}"),
            Self::Unauthorized(code, msg) => write!(f, "unauthorized ({code}): {msg}"),
            Self::Forbidden(code, msg) => write!(f, "forbidden ({code}): {msg}"),
            Self::NotFound(code, msg) => write!(f, "not found ({code}): {msg}"),
            Self::Conflict(code, msg) => write!(f, "conflict ({code}): {msg}"),
            Self::RateLimited { .. } => write!(f, "rate limited"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.code();
        match self {
            Self::RateLimited {
                retry_after_secs,
                limit,
                remaining,
            } => {
                let mut headers = HeaderMap::new();
                headers.insert("retry-after", HeaderValue::from(retry_after_secs));
                headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
                headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
                headers.insert("x-ratelimit-reset", HeaderValue::from(retry_after_secs));
                let body = ApiResponse::<()>::err(
                    code,
                    format!("Zbyt wiele żądań. Spróbuj ponownie za {retry_after_secs} s"),
                    None,
                );
                (status, headers, Json(body)).into_response()
            }
            Self::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                let body =
                    ApiResponse::<()>::err(code, "Wystąpił wewnętrzny błąd serwera", None);
                (status, Json(body)).into_response()
            }
            Self::Validation(errors) => {
                let body =
                    ApiResponse::<()>::err(code, "Nieprawidłowe dane wejściowe", Some(errors));
                (status, Json(body)).into_response()
            }
            Self::BadRequest(_, msg)
            | Self::Unauthorized(_, msg)
            | Self::Forbidden(_, msg)
            | Self::NotFound(_, msg)
            | Self::Conflict(_, msg) => {
                (status, Json(ApiResponse::<()>::err(code, msg, None))).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}
