use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use super::provider::{
    AuthProvider, ProviderError, ProviderSession, ProviderUser, SignUpOutcome, SignUpRequest,
};

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<GoTrueUser> for ProviderUser {
    fn from(u: GoTrueUser) -> Self {
        Self {
            id: u.id,
            email: u.email.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
    /// Older GoTrue releases omit this; it is derived from `expires_in`.
    #[serde(default)]
    expires_at: Option<i64>,
    user: GoTrueUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<GoTrueSession> for ProviderSession {
    fn from(s: GoTrueSession) -> Self {
        let expires_at = s
            .expires_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp() + s.expires_in);
        Self {
            access_token: s.access_token,
            refresh_token: s.refresh_token,
            token_type: s.token_type,
            expires_in: s.expires_in,
            expires_at,
            user: s.user.into(),
        }
    }
}

/// `/signup` answers with a full session when auto-confirm is on and with
/// the bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(GoTrueSession),
    User(GoTrueUser),
}

/// GoTrue has used several error shapes across releases.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn parse_error(status: u16, body: &str) -> ProviderError {
    let parsed: GoTrueErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));
    ProviderError::Rejected {
        status,
        code: parsed.error_code.or(parsed.error),
        message,
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(parse_error(status.as_u16(), &body))
}

async fn expect_success(resp: reqwest::Response) -> Result<(), ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(parse_error(status.as_u16(), &body))
}

// ── Client ──────────────────────────────────────────────────────────────────

/// HTTP client for the Supabase auth service (GoTrue, `/auth/v1`).
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl std::fmt::Debug for GoTrueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .field("service_role_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GoTrueClient {
    /// Creates a client for the project at `supabase_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        supabase_url: &str,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("firelog-server/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<ProviderSession, ProviderError> {
        let resp = self
            .http
            .post(self.url(&format!("/token?grant_type={grant_type}")))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;
        Ok(read_json::<GoTrueSession>(resp).await?.into())
    }
}

#[async_trait::async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
        let resp = self
            .http
            .post(self.url("/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": req.email,
                "password": req.password,
                "data": req.metadata,
            }))
            .send()
            .await?;
        Ok(match read_json::<SignUpBody>(resp).await? {
            SignUpBody::Session(session) => {
                let session = ProviderSession::from(session);
                SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpBody::User(user) => SignUpOutcome {
                user: user.into(),
                session: None,
            },
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let resp = self
            .http
            .post(self.url("/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        expect_success(resp).await
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        let resp = self
            .http
            .get(self.url("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(read_json::<GoTrueUser>(resp).await?.into())
    }

    async fn admin_delete_user(&self, user_id: Uuid) -> Result<(), ProviderError> {
        let resp = self
            .http
            .delete(self.url(&format!("/admin/users/{user_id}")))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;
        expect_success(resp).await
    }
}
