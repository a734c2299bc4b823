//! Integration tests for the portfolio server and client.
//!
//! Each test boots a real server on an ephemeral loopback port, backed by the
//! in-memory store, and drives it over HTTP with `portfolio-client`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p portfolio-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use portfolio_client::{AdminConsole, ApiClient, MemorySessionStore, PublicSite};
use portfolio_core::{ContactSubmission, SetupRequest};
use portfolio_server::db::MemoryStore;
use portfolio_server::services::auth::TokenService;
use portfolio_server::{AppState, ServerConfig, router};
use secrecy::SecretString;
use tokio::task::JoinHandle;

/// Signing secret shared by the test server and tests that mint tokens.
pub const TEST_JWT_SECRET: &str = "integration-test-signing-key-5f2c9a";

pub const ADMIN_USERNAME: &str = "owner";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// A running server. Aborted on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with rate limits off.
    ///
    /// # Panics
    ///
    /// Panics if the loopback listener cannot be bound.
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::for_memory_store(TEST_JWT_SECRET)).await
    }

    /// Start a server with the given configuration and a fresh in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the loopback listener cannot be bound.
    pub async fn start_with(config: ServerConfig) -> Self {
        let app = router(AppState::new(config, Arc::new(MemoryStore::new())));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Self {
            addr,
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// # Panics
    ///
    /// Panics if the base URL is invalid, which cannot happen for a bound address.
    #[must_use]
    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.base_url).expect("valid base URL")
    }

    #[must_use]
    pub fn site(&self) -> PublicSite {
        PublicSite::new(self.api())
    }

    #[must_use]
    pub fn console(&self, store: MemorySessionStore) -> AdminConsole<MemorySessionStore> {
        AdminConsole::new(self.api(), store)
    }

    /// Create the first admin through the API.
    ///
    /// # Panics
    ///
    /// Panics if setup is rejected.
    pub async fn setup_admin(&self) {
        self.api()
            .setup(&SetupRequest {
                username: Some(ADMIN_USERNAME.to_owned()),
                password: Some(ADMIN_PASSWORD.to_owned()),
                email: None,
            })
            .await
            .expect("admin setup");
    }

    /// Log a console in as the test admin.
    ///
    /// # Panics
    ///
    /// Panics if login is rejected.
    pub async fn logged_in_console(&self) -> AdminConsole<MemorySessionStore> {
        let mut console = self.console(MemorySessionStore::new());
        console
            .login(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .expect("admin login");
        console
    }

    /// Submit a contact message through the public API.
    ///
    /// # Panics
    ///
    /// Panics if the message is rejected.
    pub async fn send_message(&self, subject: &str) {
        self.api()
            .submit_message(&ContactSubmission {
                name: Some("Ada Lovelace".to_owned()),
                email: Some("ada@example.com".to_owned()),
                subject: Some(subject.to_owned()),
                message: Some(format!("Body of {subject}")),
            })
            .await
            .expect("contact message accepted");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Token service using the test server's secret.
#[must_use]
pub fn test_tokens() -> TokenService {
    TokenService::new(SecretString::from(TEST_JWT_SECRET))
}
