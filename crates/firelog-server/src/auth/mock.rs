use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use super::provider::{
    AuthProvider, ProviderError, ProviderSession, ProviderUser, SignUpOutcome, SignUpRequest,
};
use super::token::{generate_token, hash_token};

const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct StoredUser {
    id: Uuid,
    email: String,
    salt: String,
    password_hash: String,
    confirmed: bool,
}

#[derive(Debug, Clone, Copy)]
struct AccessGrant {
    user_id: Uuid,
    expires_at: i64,
}

#[derive(Debug, Default)]
struct Inner {
    /// Keyed by lowercased e-mail.
    users: HashMap<String, StoredUser>,
    access: HashMap<String, AccessGrant>,
    refresh: HashMap<String, Uuid>,
}

/// In-process identity provider with the same observable behaviour as the
/// hosted one: rotating refresh tokens, expiring access tokens and the same
/// rejection messages. Backs the tests and the `--demo` server mode.
#[derive(Debug)]
pub struct InMemoryAuthProvider {
    inner: Mutex<Inner>,
    access_ttl_secs: i64,
    require_confirmation: bool,
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            require_confirmation: false,
        }
    }

    /// Access-token lifetime. Zero or negative values issue already-expired tokens.
    #[must_use]
    pub const fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Sign-up returns no session and sign-in fails until [`confirm_email`](Self::confirm_email).
    #[must_use]
    pub const fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    pub fn confirm_email(&self, email: &str) -> bool {
        self.lock()
            .users
            .get_mut(&email.to_lowercase())
            .map(|u| u.confirmed = true)
            .is_some()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn issue_session(&self, inner: &mut Inner, user: &StoredUser) -> ProviderSession {
        let access_token = generate_token();
        let refresh_token = generate_token();
        let expires_at = chrono::Utc::now().timestamp() + self.access_ttl_secs;
        inner.access.insert(
            access_token.clone(),
            AccessGrant {
                user_id: user.id,
                expires_at,
            },
        );
        inner.refresh.insert(refresh_token.clone(), user.id);
        ProviderSession {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl_secs,
            expires_at,
            user: ProviderUser {
                id: user.id,
                email: user.email.clone(),
            },
        }
    }
}

fn salted_hash(salt: &str, password: &str) -> String {
    hash_token(&format!("{salt}:{password}"))
}

fn find_by_id(inner: &Inner, id: Uuid) -> Option<&StoredUser> {
    inner.users.values().find(|u| u.id == id)
}

#[async_trait::async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(&self, req: &SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
        let key = req.email.to_lowercase();
        let mut inner = self.lock();
        if inner.users.contains_key(&key) {
            return Err(ProviderError::rejected(
                422,
                Some("user_already_exists"),
                "User already registered",
            ));
        }
        let salt = generate_token();
        let user = StoredUser {
            id: Uuid::new_v4(),
            email: key.clone(),
            password_hash: salted_hash(&salt, &req.password),
            salt,
            confirmed: !self.require_confirmation,
        };
        inner.users.insert(key, user.clone());

        let session = user
            .confirmed
            .then(|| self.issue_session(&mut inner, &user));
        drop(inner);
        Ok(SignUpOutcome {
            user: ProviderUser {
                id: user.id,
                email: user.email,
            },
            session,
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get(&email.to_lowercase())
            .filter(|u| u.password_hash == salted_hash(&u.salt, password))
            .cloned()
            .ok_or_else(|| {
                ProviderError::rejected(400, Some("invalid_credentials"), "Invalid login credentials")
            })?;
        if !user.confirmed {
            return Err(ProviderError::rejected(
                400,
                Some("email_not_confirmed"),
                "Email not confirmed",
            ));
        }
        Ok(self.issue_session(&mut inner, &user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        let mut inner = self.lock();
        let not_found = || {
            ProviderError::rejected(
                400,
                Some("refresh_token_not_found"),
                "Invalid Refresh Token: Refresh Token Not Found",
            )
        };
        // Refresh tokens are single use.
        let user_id = inner.refresh.remove(refresh_token).ok_or_else(not_found)?;
        let user = find_by_id(&inner, user_id).cloned().ok_or_else(not_found)?;
        Ok(self.issue_session(&mut inner, &user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let mut inner = self.lock();
        let grant = inner.access.remove(access_token).ok_or_else(|| {
            ProviderError::rejected(401, Some("bad_jwt"), "invalid JWT: unable to parse or verify signature")
        })?;
        // Global scope: every refresh token of the user is revoked.
        inner.refresh.retain(|_, uid| *uid != grant.user_id);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        let inner = self.lock();
        let now = chrono::Utc::now().timestamp();
        let grant = inner
            .access
            .get(access_token)
            .filter(|g| g.expires_at > now)
            .ok_or_else(|| {
                ProviderError::rejected(401, Some("bad_jwt"), "invalid JWT: token is expired or unknown")
            })?;
        let user = find_by_id(&inner, grant.user_id)
            .ok_or_else(|| ProviderError::rejected(404, Some("user_not_found"), "User not found"))?;
        Ok(ProviderUser {
            id: user.id,
            email: user.email.clone(),
        })
    }

    async fn admin_delete_user(&self, user_id: Uuid) -> Result<(), ProviderError> {
        let mut inner = self.lock();
        let key = find_by_id(&inner, user_id)
            .map(|u| u.email.clone())
            .ok_or_else(|| ProviderError::rejected(404, Some("user_not_found"), "User not found"))?;
        inner.users.remove(&key);
        inner.access.retain(|_, g| g.user_id != user_id);
        inner.refresh.retain(|_, uid| *uid != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::auth::provider::SignUpMetadata;

    fn signup(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "Strazak#2026".to_string(),
            metadata: SignUpMetadata {
                first_name: "Jan".to_string(),
                last_name: "Kowalski".to_string(),
                fire_department_id: Uuid::new_v4(),
            },
        }
    }

    fn rejection_code(err: &ProviderError) -> Option<&str> {
        match err {
            ProviderError::Rejected { code, .. } => code.as_deref(),
            ProviderError::Transport(_) => None,
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let provider = InMemoryAuthProvider::new();
        let outcome = provider.sign_up(&signup("Jan@OSP.pl")).await.unwrap();
        assert!(outcome.session.is_some());
        assert_eq!(outcome.user.email, "jan@osp.pl");

        let session = provider
            .sign_in_with_password("jan@osp.pl", "Strazak#2026")
            .await
            .unwrap();
        let user = provider.get_user(&session.access_token).await.unwrap();
        assert_eq!(user.id, outcome.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let provider = InMemoryAuthProvider::new();
        provider.sign_up(&signup("jan@osp.pl")).await.unwrap();
        let err = provider.sign_up(&signup("JAN@osp.pl")).await.unwrap_err();
        assert_eq!(rejection_code(&err), Some("user_already_exists"));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let provider = InMemoryAuthProvider::new();
        provider.sign_up(&signup("jan@osp.pl")).await.unwrap();
        let err = provider
            .sign_in_with_password("jan@osp.pl", "Zle#haslo1")
            .await
            .unwrap_err();
        assert_eq!(rejection_code(&err), Some("invalid_credentials"));
        let err = provider
            .sign_in_with_password("nikt@osp.pl", "Strazak#2026")
            .await
            .unwrap_err();
        assert_eq!(rejection_code(&err), Some("invalid_credentials"));
    }

    #[tokio::test]
    async fn unconfirmed_email_blocks_sign_in() {
        let provider = InMemoryAuthProvider::new().requiring_confirmation();
        let outcome = provider.sign_up(&signup("jan@osp.pl")).await.unwrap();
        assert!(outcome.session.is_none());

        let err = provider
            .sign_in_with_password("jan@osp.pl", "Strazak#2026")
            .await
            .unwrap_err();
        assert_eq!(rejection_code(&err), Some("email_not_confirmed"));

        assert!(provider.confirm_email("jan@osp.pl"));
        assert!(
            provider
                .sign_in_with_password("jan@osp.pl", "Strazak#2026")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn refresh_rotates_tokens() {
        let provider = InMemoryAuthProvider::new();
        let first = provider
            .sign_up(&signup("jan@osp.pl"))
            .await
            .unwrap()
            .session
            .unwrap();
        let second = provider.refresh_session(&first.refresh_token).await.unwrap();
        assert_ne!(first.access_token, second.access_token);

        let err = provider
            .refresh_session(&first.refresh_token)
            .await
            .unwrap_err();
        assert_eq!(rejection_code(&err), Some("refresh_token_not_found"));
        assert!(provider.refresh_session(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected() {
        let provider = InMemoryAuthProvider::new().with_access_ttl(0);
        let session = provider
            .sign_up(&signup("jan@osp.pl"))
            .await
            .unwrap()
            .session
            .unwrap();
        assert!(provider.get_user(&session.access_token).await.is_err());
    }

    #[tokio::test]
    async fn sign_out_revokes_tokens() {
        let provider = InMemoryAuthProvider::new();
        let session = provider
            .sign_up(&signup("jan@osp.pl"))
            .await
            .unwrap()
            .session
            .unwrap();
        provider.sign_out(&session.access_token).await.unwrap();
        assert!(provider.get_user(&session.access_token).await.is_err());
        assert!(provider.refresh_session(&session.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn admin_delete_removes_user() {
        let provider = InMemoryAuthProvider::new();
        let outcome = provider.sign_up(&signup("jan@osp.pl")).await.unwrap();
        provider.admin_delete_user(outcome.user.id).await.unwrap();
        assert_eq!(provider.user_count(), 0);
        let err = provider.admin_delete_user(outcome.user.id).await.unwrap_err();
        assert_eq!(rejection_code(&err), Some("user_not_found"));
    }
}
