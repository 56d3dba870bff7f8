use std::sync::Arc;

use crate::auth::provider::AuthProvider;
use crate::rate_limit::{RateLimiter, RateLimits};
use crate::repository::Repository;
use crate::services::{AdminService, AuthService, DictionaryService, MeldunkiService, ProfileService};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub auth: Arc<dyn AuthProvider>,
    pub rate_limiter: Arc<RateLimiter>,
    pub limits: RateLimits,
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            repo,
            auth,
            rate_limiter: Arc::new(RateLimiter::new()),
            limits: RateLimits::default(),
            trust_proxy: false,
        }
    }

    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.auth.as_ref(), self.repo.as_ref())
    }

    pub fn meldunki_service(&self) -> MeldunkiService<'_> {
        MeldunkiService::new(self.repo.as_ref())
    }

    pub fn profile_service(&self) -> ProfileService<'_> {
        ProfileService::new(self.repo.as_ref())
    }

    pub fn admin_service(&self) -> AdminService<'_> {
        AdminService::new(self.auth.as_ref(), self.repo.as_ref())
    }

    pub fn dictionary_service(&self) -> DictionaryService<'_> {
        DictionaryService::new(self.repo.as_ref())
    }
}
