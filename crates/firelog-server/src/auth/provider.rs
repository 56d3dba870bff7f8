use std::fmt;

use uuid::Uuid;

use firelog_common::dto::auth::{SessionDto, UserDto};

// ── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: String,
}

impl From<ProviderUser> for UserDto {
    fn from(u: ProviderUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: ProviderUser,
}

impl fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl From<ProviderSession> for SessionDto {
    fn from(s: ProviderSession) -> Self {
        Self {
            access_token: s.access_token,
            refresh_token: s.refresh_token,
            token_type: s.token_type,
            expires_in: s.expires_in,
            expires_at: s.expires_at,
        }
    }
}

/// Stored in the provider's `user_metadata` at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SignUpMetadata {
    pub first_name: String,
    pub last_name: String,
    pub fire_department_id: Uuid,
}

#[derive(Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub metadata: SignUpMetadata,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Sign-up result. `session` is `None` while the e-mail awaits confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: ProviderUser,
    pub session: Option<ProviderSession>,
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ProviderError {
    /// The provider answered and refused the request.
    Rejected {
        status: u16,
        /// Machine code such as `invalid_credentials`, when the provider sends one.
        code: Option<String>,
        message: String,
    },
    /// The provider could not be reached or answered with something unreadable.
    Transport(String),
}

impl ProviderError {
    pub fn rejected(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected {
                status,
                code: Some(code),
                message,
            } => write!(f, "provider rejected request ({status} {code}): {message}"),
            Self::Rejected {
                status, message, ..
            } => write!(f, "provider rejected request ({status}): {message}"),
            Self::Transport(msg) => write!(f, "provider unreachable: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

// ── Trait ───────────────────────────────────────────────────────────────────

/// The identity provider: password sign-up and sign-in, refresh-token
/// rotation, sign-out, bearer token introspection and admin deletion.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<SignUpOutcome, ProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Resolve an access token to its user. Expired or unknown tokens are rejected.
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;

    async fn admin_delete_user(&self, user_id: Uuid) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_when_present() {
        let err = ProviderError::rejected(400, Some("invalid_credentials"), "Invalid login credentials");
        assert_eq!(
            err.to_string(),
            "provider rejected request (400 invalid_credentials): Invalid login credentials"
        );
        let err = ProviderError::rejected(422, None, "User already registered");
        assert_eq!(
            err.to_string(),
            "provider rejected request (422): User already registered"
        );
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = ProviderSession {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: 1_700_000_000,
            user: ProviderUser {
                id: Uuid::nil(),
                email: "a@b.pl".to_string(),
            },
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));

        let dto = SessionDto::from(session);
        assert_eq!(dto.access_token, "secret-access");
        assert_eq!(dto.expires_at, 1_700_000_000);
    }
}
