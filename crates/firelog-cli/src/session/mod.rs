//! Client-side session persistence and silent token refresh.

mod file_store;
mod manager;
mod memory_store;

use std::fmt;

use serde::{Deserialize, Serialize};

use firelog_common::dto::auth::SessionDto;

pub use file_store::FileTokenStore;
pub use manager::{REFRESH_BUFFER_SECS, TokenManager};
pub use memory_store::MemoryTokenStore;

/// Tokens kept between CLI invocations.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl StoredTokens {
    pub fn from_session(session: &SessionDto, email: Option<&str>) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
            email: email.map(str::to_string),
        }
    }
}

// Manual Debug impl to redact both tokens
impl fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("email", &self.email)
            .finish()
    }
}

/// Where the session lives between invocations.
pub trait TokenStore {
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read.
    fn load(&self) -> anyhow::Result<Option<StoredTokens>>;

    /// # Errors
    ///
    /// Returns an error if the tokens cannot be persisted.
    fn save(&self, tokens: &StoredTokens) -> anyhow::Result<()>;

    /// Forget the session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be removed.
    fn clear(&self) -> anyhow::Result<()>;
}
