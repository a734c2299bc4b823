//! Admin console flows: session lifecycle, inbox triage, project editing.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use portfolio_client::{
    ClientError, MemorySessionStore, MessageFilter, ProjectForm, SessionStore, StoredSession,
};
use portfolio_core::{AdminId, AdminIdentity, MessageId, ProjectId, ProjectStatus};
use portfolio_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, TestServer, test_tokens};
use portfolio_server::services::auth::{TOKEN_LIFETIME_DAYS, TokenService};
use secrecy::SecretString;

// =============================================================================
// Session Lifecycle
// =============================================================================

#[tokio::test]
async fn test_login_persists_and_restores_session() {
    let server = TestServer::start().await;
    server.setup_admin().await;

    let store = MemorySessionStore::new();
    let mut console = server.console(store.clone());
    let admin = console.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(admin.username, ADMIN_USERNAME);
    assert!(store.load().unwrap().is_some());

    // A fresh console picks up the stored token
    let mut restarted = server.console(store.clone());
    let identity = restarted.restore().await.unwrap().unwrap();
    assert_eq!(identity.username, ADMIN_USERNAME);
    assert_eq!(identity.id, admin.id);
    assert_eq!(restarted.username(), Some(ADMIN_USERNAME));

    restarted.logout().unwrap();
    assert!(store.load().unwrap().is_none());
    assert!(!restarted.is_logged_in());
}

#[tokio::test]
async fn test_restore_discards_expired_token() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    let mut console = server.logged_in_console().await;
    let identity = console.restore().await.unwrap().unwrap();

    let expired = test_tokens()
        .issue_at(&identity, Utc::now() - Duration::days(TOKEN_LIFETIME_DAYS + 1))
        .unwrap();
    let store = MemorySessionStore::new();
    store
        .save(&StoredSession {
            token: expired,
            username: ADMIN_USERNAME.to_owned(),
        })
        .unwrap();

    let mut stale = server.console(store.clone());
    assert!(stale.restore().await.unwrap().is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_restore_discards_foreign_token() {
    let server = TestServer::start().await;
    server.setup_admin().await;

    let foreign = TokenService::new(SecretString::from("some-other-signing-key-entirely"))
        .issue(&AdminIdentity {
            id: AdminId::generate(),
            username: ADMIN_USERNAME.to_owned(),
        })
        .unwrap();
    let store = MemorySessionStore::new();
    store
        .save(&StoredSession {
            token: foreign,
            username: ADMIN_USERNAME.to_owned(),
        })
        .unwrap();

    assert!(server.console(store.clone()).restore().await.unwrap().is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_token_expiring_mid_use_surfaces_session_expired() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    let identity = server
        .logged_in_console()
        .await
        .restore()
        .await
        .unwrap()
        .unwrap();

    // Valid for about three more seconds
    let issued_at = Utc::now() - Duration::days(TOKEN_LIFETIME_DAYS) + Duration::seconds(3);
    let store = MemorySessionStore::new();
    store
        .save(&StoredSession {
            token: test_tokens().issue_at(&identity, issued_at).unwrap(),
            username: ADMIN_USERNAME.to_owned(),
        })
        .unwrap();

    let mut console = server.console(store.clone());
    assert!(console.restore().await.unwrap().is_some());

    tokio::time::sleep(std::time::Duration::from_secs(4)).await;

    assert!(matches!(
        console.refresh().await,
        Err(ClientError::SessionExpired)
    ));
    assert!(!console.is_logged_in());
    assert!(store.load().unwrap().is_none());
    assert!(matches!(
        console.refresh().await,
        Err(ClientError::NotLoggedIn)
    ));
}

#[tokio::test]
async fn test_bad_credentials() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    let mut console = server.console(MemorySessionStore::new());

    let err = console
        .login(ADMIN_USERNAME, "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!console.is_logged_in());
}

// =============================================================================
// Inbox
// =============================================================================

#[tokio::test]
async fn test_inbox_triage() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    for subject in ["one", "two", "three"] {
        server.send_message(subject).await;
    }
    let mut console = server.logged_in_console().await;

    let dashboard = console.refresh().await.unwrap();
    let subjects: Vec<_> = dashboard.messages.iter().map(|m| m.subject.as_str()).collect();
    assert_eq!(subjects, ["three", "two", "one"]);
    assert_eq!(dashboard.stats.unread_messages, 3);

    // Opening an unread message marks it read and refreshes the counters
    let newest = dashboard.messages[0].id;
    let opened = console.open_message(newest).await.unwrap();
    assert!(opened.message.read);
    let inbox = opened.inbox.unwrap();
    assert_eq!(inbox.stats.unread_messages, 2);
    assert_eq!(inbox.messages(MessageFilter::Read).len(), 1);
    assert_eq!(inbox.messages(MessageFilter::Unread).len(), 2);

    // Opening it again changes nothing
    let again = console.open_message(newest).await.unwrap();
    assert!(again.inbox.is_none());

    // Marking read twice is fine
    let oldest = dashboard.messages[2].id;
    console.mark_read(oldest).await.unwrap();
    let inbox = console.mark_read(oldest).await.unwrap();
    assert_eq!(inbox.stats.unread_messages, 1);

    let inbox = console.delete_message(oldest).await.unwrap();
    assert_eq!(inbox.stats.total_messages, 2);
    assert!(inbox.messages.iter().all(|m| m.id != oldest));
}

#[tokio::test]
async fn test_missing_message() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    let mut console = server.logged_in_console().await;
    let id = MessageId::generate();

    assert!(matches!(
        console.open_message(id).await,
        Err(ClientError::NotFound { .. })
    ));
    assert_eq!(console.mark_read(id).await.unwrap_err().status(), Some(404));
    assert_eq!(console.delete_message(id).await.unwrap_err().status(), Some(404));
    // Not an auth failure, so the session survives
    assert!(console.is_logged_in());
}

#[tokio::test]
async fn test_recent_panel_shows_five() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    for i in 0..7 {
        server.send_message(&format!("message {i}")).await;
    }
    let mut console = server.logged_in_console().await;

    let dashboard = console.refresh().await.unwrap();
    assert_eq!(dashboard.stats.total_messages, 7);
    assert_eq!(dashboard.recent_messages().len(), 5);
    assert_eq!(dashboard.recent_messages()[0].subject, "message 6");
}

// =============================================================================
// Projects
// =============================================================================

#[tokio::test]
async fn test_project_create_edit_delete() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    let mut console = server.logged_in_console().await;

    let form = ProjectForm {
        title: "Portfolio".to_owned(),
        description: "This site".to_owned(),
        features: "Contact form, , Admin console ".to_owned(),
        technologies: "Rust,axum,sqlx".to_owned(),
        live_url: "https://portfolio.example.com".to_owned(),
        featured: true,
        order: 1,
        ..ProjectForm::default()
    };
    let (created, catalog) = console.save_project(&form).await.unwrap();
    assert_eq!(created.features, ["Contact form", "Admin console"]);
    assert_eq!(created.technologies, ["Rust", "axum", "sqlx"]);
    assert_eq!(created.status, ProjectStatus::Completed);
    assert_eq!(catalog.stats.total_projects, 1);

    // Edit: clear the live link, switch status
    let mut edit = ProjectForm::from_project(&created);
    edit.live_url.clear();
    edit.status = ProjectStatus::InProgress;
    let (updated, _) = console.save_project(&edit).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.live_url, None);
    assert_eq!(updated.status, ProjectStatus::InProgress);
    assert_eq!(updated.features, created.features);

    let catalog = console.delete_project(created.id).await.unwrap();
    assert!(catalog.projects.is_empty());
    assert_eq!(catalog.stats.total_projects, 0);

    assert_eq!(
        console.delete_project(created.id).await.unwrap_err().status(),
        Some(404)
    );
}

#[tokio::test]
async fn test_invalid_project_is_rejected() {
    let server = TestServer::start().await;
    server.setup_admin().await;
    let mut console = server.logged_in_console().await;

    let err = console
        .save_project(&ProjectForm::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let missing = ProjectForm {
        id: Some(ProjectId::generate()),
        title: "Ghost".to_owned(),
        description: "Gone".to_owned(),
        ..ProjectForm::default()
    };
    assert_eq!(
        console.save_project(&missing).await.unwrap_err().status(),
        Some(404)
    );
}
