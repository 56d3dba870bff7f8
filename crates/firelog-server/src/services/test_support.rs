#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use firelog_common::dto::auth::RegisterRequest;
use firelog_common::dto::meldunki::CreateMeldunekRequest;
use firelog_common::role::Role;

use crate::auth::mock::InMemoryAuthProvider;
use crate::repository::{FireDepartment, InMemoryRepository, Profile, Repository};

use super::{AdminService, AuthService, DictionaryService, MeldunkiService, ProfileService};

pub const STRONG_PASSWORD: &str = "Strazak#2026";

pub fn register_request(dept: &FireDepartment, email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: STRONG_PASSWORD.to_string(),
        first_name: "Jan".to_string(),
        last_name: "Kowalski".to_string(),
        fire_department_id: dept.id.to_string(),
        verification_code: dept.verification_code.clone(),
    }
}

pub fn create_request(name: &str) -> CreateMeldunekRequest {
    let start = Utc::now() - Duration::hours(3);
    CreateMeldunekRequest {
        incident_name: name.to_string(),
        incident_date: start.date_naive(),
        location_address: "ul. Strażacka 1".to_string(),
        description: "Opis działań ratowniczych".to_string(),
        forces_and_resources: Some("GBA 2,5/16".to_string()),
        commander: None,
        driver: None,
        start_time: start,
        end_time: Some(start + Duration::hours(1)),
    }
}

pub struct Fixture {
    pub repo: Arc<InMemoryRepository>,
    pub provider: Arc<InMemoryAuthProvider>,
    pub department: FireDepartment,
}

impl Fixture {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let department = repo.seed_demo();
        Self {
            repo,
            provider: Arc::new(InMemoryAuthProvider::new()),
            department,
        }
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.provider.as_ref(), self.repo.as_ref())
    }

    pub fn meldunki(&self) -> MeldunkiService<'_> {
        MeldunkiService::new(self.repo.as_ref())
    }

    pub fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(self.repo.as_ref())
    }

    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self.provider.as_ref(), self.repo.as_ref())
    }

    pub fn dictionary(&self) -> DictionaryService<'_> {
        DictionaryService::new(self.repo.as_ref())
    }

    /// Register through the service and set the role directly.
    pub async fn user(&self, email: &str, role: Role) -> Profile {
        self.user_in(&self.department, email, role).await
    }

    pub async fn user_in(&self, dept: &FireDepartment, email: &str, role: Role) -> Profile {
        let resp = self
            .auth()
            .register(&register_request(dept, email))
            .await
            .unwrap();
        self.repo
            .update_profile_role(resp.user.id, role)
            .await
            .unwrap()
            .unwrap()
    }

    /// A second department in the same county.
    pub fn other_department(&self) -> FireDepartment {
        self.repo
            .add_fire_department(self.department.county_id, "OSP Sąsiednia", "SASIAD1")
    }

    pub async fn profile(&self, id: Uuid) -> Option<Profile> {
        self.repo.get_profile(id).await.unwrap()
    }
}
