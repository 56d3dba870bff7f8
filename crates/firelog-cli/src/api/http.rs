use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use firelog_common::envelope::ApiResponse;

use super::ApiError;

const TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Blocking client for the FireLog API. Unwraps the response envelope.
#[derive(Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

// Manual Debug impl to redact the bearer token
impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Unauthenticated client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(format!("firelog-cli/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("could not build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// A copy of this client that sends `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// # Errors
    ///
    /// Transport failures, an [`ApiError`] envelope, or an undecodable body.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(self.http.get(self.url(path)))
    }

    /// # Errors
    ///
    /// Transport failures, an [`ApiError`] envelope, or an undecodable body.
    pub fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> anyhow::Result<T> {
        self.send(self.http.get(self.url(path)).query(query))
    }

    /// # Errors
    ///
    /// Transport failures, an [`ApiError`] envelope, or an undecodable body.
    pub fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        self.send(self.http.post(self.url(path)).json(body))
    }

    /// # Errors
    ///
    /// Transport failures, an [`ApiError`] envelope, or an undecodable body.
    pub fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        self.send(self.http.patch(self.url(path)).json(body))
    }

    /// # Errors
    ///
    /// Transport failures, an [`ApiError`] envelope, or an undecodable body.
    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(self.http.delete(self.url(path)))
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> anyhow::Result<T> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req
            .send()
            .with_context(|| format!("could not reach {}", self.base_url))?;
        decode(resp)
    }
}

/// Unwrap a response envelope into `T` or an [`ApiError`].
///
/// # Errors
///
/// Returns an [`ApiError`] for error envelopes, or a plain error when the
/// body is not an envelope at all.
pub fn decode<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    let status = resp.status();
    let retry_after_secs = resp
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    let text = resp.text().context("could not read response body")?;
    let envelope: ApiResponse<T> = serde_json::from_str(&text).with_context(|| {
        format!("unexpected response from server (HTTP {status}): {text}")
    })?;
    envelope.into_result().map_err(|body| {
        ApiError {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
            details: body.details,
            retry_after_secs,
        }
        .into()
    })
}
