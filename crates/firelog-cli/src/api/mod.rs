pub mod auth_client;
pub mod dictionary_client;
pub mod http;
pub mod meldunki_client;
pub mod profile_client;

use firelog_common::envelope::FieldErrors;
use firelog_common::error_code::ErrorCode;

pub use http::Client;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Returns `true` if the URL uses HTTPS or targets localhost.
pub fn is_secure_url(url: &str) -> bool {
    if url.starts_with("https://") {
        return true;
    }
    url.starts_with("http://localhost") || url.starts_with("http://127.0.0.1")
}

/// Error envelope returned by the server, with the HTTP status it came with.
///
/// Carried inside `anyhow::Error`; callers branch on it with
/// `err.downcast_ref::<ApiError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<FieldErrors>,
    /// Parsed `Retry-After` on HTTP 429.
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, HTTP {})", self.message, self.code, self.status)?;
        if let Some(secs) = self.retry_after_secs {
            write!(f, "; retry in {secs}s")?;
        }
        if let Some(details) = &self.details {
            for (field, msg) in details {
                write!(f, "\n  {field}: {msg}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
