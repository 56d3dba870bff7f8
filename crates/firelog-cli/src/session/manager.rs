use anyhow::Context;

use firelog_common::dto::auth::SessionDto;

use super::{StoredTokens, TokenStore};
use crate::api::{self, Client};

/// Tokens are refreshed this long before they expire.
pub const REFRESH_BUFFER_SECS: i64 = 300;

/// Keeps the stored session fresh and hands out authorized clients.
#[derive(Debug)]
pub struct TokenManager<S> {
    store: S,
    client: Client,
    buffer: i64,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl<S: TokenStore> TokenManager<S> {
    pub fn new(store: S, client: Client) -> Self {
        Self {
            store,
            client,
            buffer: REFRESH_BUFFER_SECS,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot persist the session.
    pub fn save_session(&self, session: &SessionDto, email: Option<&str>) -> anyhow::Result<()> {
        self.store.save(&StoredTokens::from_session(session, email))
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn tokens(&self) -> anyhow::Result<Option<StoredTokens>> {
        self.store.load()
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_token_valid(&self) -> anyhow::Result<bool> {
        self.is_token_valid_at(now())
    }

    /// `false` when nothing is stored or the token is inside the refresh
    /// window at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_token_valid_at(&self, now: i64) -> anyhow::Result<bool> {
        Ok(self
            .store
            .load()?
            .is_some_and(|t| now < t.expires_at - self.buffer))
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn needs_refresh(&self) -> anyhow::Result<bool> {
        self.needs_refresh_at(now())
    }

    /// `true` only when a session is stored and has entered the refresh window.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn needs_refresh_at(&self, now: i64) -> anyhow::Result<bool> {
        Ok(self
            .store
            .load()?
            .is_some_and(|t| now >= t.expires_at - self.buffer))
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Any failed refresh clears the store so the user is asked to log in
    /// again.
    ///
    /// # Errors
    ///
    /// Fails when no session is stored or the server refuses the refresh.
    pub fn refresh(&self) -> anyhow::Result<StoredTokens> {
        let current = self
            .store
            .load()?
            .ok_or_else(|| anyhow::anyhow!("not logged in"))?;
        match api::auth_client::refresh(&self.client, &current.refresh_token) {
            Ok(session) => {
                let fresh = StoredTokens::from_session(&session, current.email.as_deref());
                self.store.save(&fresh)?;
                Ok(fresh)
            }
            Err(e) => {
                self.store.clear()?;
                Err(e).context("session refresh failed, please log in again")
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared.
    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.clear()
    }

    /// The stored access token, refreshed first if it is about to expire.
    ///
    /// # Errors
    ///
    /// Fails when not logged in or when the refresh is refused.
    pub fn valid_access_token(&self) -> anyhow::Result<String> {
        let tokens = self
            .store
            .load()?
            .ok_or_else(|| anyhow::anyhow!("not logged in; run `firelog auth login` first"))?;
        if now() < tokens.expires_at - self.buffer {
            return Ok(tokens.access_token);
        }
        Ok(self.refresh()?.access_token)
    }

    /// A client carrying a valid bearer token.
    ///
    /// # Errors
    ///
    /// See [`Self::valid_access_token`].
    pub fn authorized_client(&self) -> anyhow::Result<Client> {
        Ok(self.client.with_token(self.valid_access_token()?))
    }
}
