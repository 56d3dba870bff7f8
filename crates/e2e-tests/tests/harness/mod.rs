// Not all test binaries use every harness method; each test file compiles
// the harness independently, so some items appear unused per-binary.
#![allow(
    dead_code,
    unused_imports,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc
)]

use std::net::SocketAddr;

use tokio::task::JoinHandle;

use firelog::api::{Client, auth_client};
use firelog::session::{MemoryTokenStore, TokenManager};
use firelog_common::dto::auth::AuthResponse;
use firelog_common::role::Role;
use firelog_server::repository::Profile;
use firelog_server::routes::create_router;
use firelog_server::routes::test_helpers::{self, STRONG_PASSWORD, TestBackends};
use firelog_server::state::AppState;

/// In-process server on an OS-assigned port, backed by the in-memory
/// repository and auth provider.
pub struct TestHarness {
    pub server_addr: SocketAddr,
    pub base_url: String,
    pub backends: TestBackends,
    server_handle: JoinHandle<()>,
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_custom_state(|_| {}).await
    }

    /// Build a harness after letting `customize` adjust the state
    /// (rate limits, proxy trust, ...).
    pub async fn with_custom_state(customize: impl FnOnce(&mut AppState)) -> Self {
        test_helpers::init_test_tracing();
        let mut backends = test_helpers::make_state();
        customize(&mut backends.state);

        let app = create_router(backends.state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let base_url = format!("http://{addr}");

        let client = reqwest::Client::new();
        let mut server_ready = false;
        for _ in 0..40 {
            if client
                .get(format!("{base_url}/health"))
                .send()
                .await
                .is_ok()
            {
                server_ready = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(server_ready, "server did not become ready within 200ms");

        Self {
            server_addr: addr,
            base_url,
            backends,
            server_handle,
        }
    }

    /// Unauthenticated API client pointed at this server.
    pub fn client(&self) -> Client {
        Client::new(&self.base_url).unwrap()
    }

    /// Token manager over an empty in-memory store.
    pub fn token_manager(&self) -> TokenManager<MemoryTokenStore> {
        TokenManager::new(MemoryTokenStore::new(), self.client())
    }

    /// Create an account in the seeded department with `role`. The password
    /// is [`STRONG_PASSWORD`].
    pub async fn user(&self, email: &str, role: Role) -> Profile {
        self.backends.user(email, role).await.0
    }

    // ── Blocking helpers (wrap spawn_blocking boilerplate) ───────

    /// Run blocking client code off the async runtime.
    pub async fn blocking<T, F>(&self, f: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(Client) -> T + Send + 'static,
    {
        let client = self.client();
        tokio::task::spawn_blocking(move || f(client))
            .await
            .unwrap()
    }

    /// Log in through the client library.
    pub async fn try_login(&self, email: &str, password: &str) -> anyhow::Result<AuthResponse> {
        let email = email.to_string();
        let password = password.to_string();
        self.blocking(move |client| auth_client::login(&client, &email, &password))
            .await
    }

    /// Log in with the strong test password and return an authorized client.
    pub async fn login(&self, email: &str) -> Client {
        let resp = self.try_login(email, STRONG_PASSWORD).await.unwrap();
        let token = resp.session.expect("login returned no session").access_token;
        self.client().with_token(token)
    }
}

/// Run blocking code with an already-authorized client.
pub async fn with_client<T, F>(client: &Client, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(Client) -> T + Send + 'static,
{
    let client = client.clone();
    tokio::task::spawn_blocking(move || f(client))
        .await
        .unwrap()
}
