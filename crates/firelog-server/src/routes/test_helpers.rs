//! Shared test utilities for route handler tests.
//!
//! Imported in each route module's `#[cfg(test)]` block via
//! `use crate::routes::test_helpers::*;` and, with the `test-helpers`
//! feature, by the integration and e2e test binaries.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc, clippy::panic)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};

use firelog_common::dto::auth::RegisterRequest;
use firelog_common::role::Role;

use crate::auth::mock::InMemoryAuthProvider;
use crate::repository::{FireDepartment, InMemoryRepository, Profile, Repository};
use crate::state::AppState;

/// Satisfies every password rule.
pub const STRONG_PASSWORD: &str = "Strazak#2026";

/// Initialize a tracing subscriber that writes to the test output buffer.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("firelog_server=debug")
        .try_init();
}

/// Assert an HTTP response has the expected status code and return the body.
///
/// On failure, prints the response body so CI output shows the error.
pub async fn assert_status(resp: axum::response::Response, expected: StatusCode) -> Bytes {
    let actual = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 65536)
        .await
        .unwrap_or_default();
    if actual != expected {
        let body_str = String::from_utf8_lossy(&body);
        panic!(
            "assertion `left == right` failed\n  left: {actual}\n right: {expected}\n  body: {body_str}"
        );
    }
    body
}

pub fn json_body(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).expect("response body is not JSON")
}

/// In-memory backends plus the state wired on top of them.
pub struct TestBackends {
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub provider: Arc<InMemoryAuthProvider>,
    /// The seeded demo department.
    pub department: FireDepartment,
}

impl TestBackends {
    /// Register through the auth service, set `role`, and return the
    /// profile together with a live access token.
    pub async fn user(&self, email: &str, role: Role) -> (Profile, String) {
        self.user_in(&self.department, email, role).await
    }

    pub async fn user_in(
        &self,
        department: &FireDepartment,
        email: &str,
        role: Role,
    ) -> (Profile, String) {
        let resp = self
            .state
            .auth_service()
            .register(&register_request(department, email))
            .await
            .unwrap();
        let profile = self
            .repo
            .update_profile_role(resp.user.id, role)
            .await
            .unwrap()
            .unwrap();
        let token = resp.session.expect("provider issued no session").access_token;
        (profile, token)
    }

    /// A second department in the seeded county.
    pub fn other_department(&self) -> FireDepartment {
        self.repo
            .add_fire_department(self.department.county_id, "OSP Sąsiednia", "SASIAD1")
    }
}

/// Seeded in-memory state with the default rate limits.
pub fn make_state() -> TestBackends {
    let repo = Arc::new(InMemoryRepository::new());
    let department = repo.seed_demo();
    let provider = Arc::new(InMemoryAuthProvider::new());
    let state = AppState::new(repo.clone(), provider.clone());
    TestBackends {
        state,
        repo,
        provider,
        department,
    }
}

pub fn register_request(department: &FireDepartment, email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: STRONG_PASSWORD.to_string(),
        first_name: "Jan".to_string(),
        last_name: "Kowalski".to_string(),
        fire_department_id: department.id.to_string(),
        verification_code: department.verification_code.clone(),
    }
}

pub fn register_body(department: &FireDepartment, email: &str) -> Value {
    json!({
        "email": email,
        "password": STRONG_PASSWORD,
        "first_name": "Jan",
        "last_name": "Kowalski",
        "fire_department_id": department.id,
        "verification_code": department.verification_code,
    })
}

/// A valid incident body that started three hours ago.
pub fn meldunek_body(name: &str) -> Value {
    let start = chrono::Utc::now() - chrono::Duration::hours(3);
    json!({
        "incident_name": name,
        "incident_date": start.date_naive(),
        "location_address": "ul. Strażacka 1",
        "description": "Opis działań ratowniczych",
        "start_time": start,
        "end_time": start + chrono::Duration::hours(1),
    })
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::DELETE, uri, token, None)
}

pub fn send_json(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    request(method, uri, token, Some(body.to_string()))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
