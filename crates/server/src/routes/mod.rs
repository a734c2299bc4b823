//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Store connectivity
//!
//! # Public API
//! GET    /api/projects                    - Project listing
//! POST   /api/messages                    - Contact form (rate limited)
//! POST   /api/admin/login                 - Issue bearer token (rate limited)
//! POST   /api/admin/setup                 - Create first admin (rate limited)
//!
//! # Admin API (bearer token)
//! GET    /api/admin/session               - Identity behind the token
//! GET    /api/admin/messages              - Inbox, newest first
//! PATCH  /api/admin/messages/{id}/read    - Mark read
//! DELETE /api/admin/messages/{id}         - Delete message
//! POST   /api/admin/projects              - Create project
//! PUT    /api/admin/projects/{id}         - Merge-update project
//! DELETE /api/admin/projects/{id}         - Delete project
//! GET    /api/admin/stats                 - Dashboard counters
//! ```
//!
//! Everything else is served from the static directory.

pub mod admin;
pub mod health;
pub mod messages;
pub mod projects;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, contact_rate_limiter, require_admin};
use crate::state::AppState;

/// Routes that require no token.
fn public_routes(config: &ServerConfig) -> Router<AppState> {
    let mut auth = Router::new()
        .route("/admin/login", post(admin::auth::login))
        .route("/admin/setup", post(admin::auth::setup));
    let mut contact = Router::new().route("/messages", post(messages::submit));

    if config.rate_limit_enabled {
        auth = auth.layer(auth_rate_limiter(config.trust_proxy_headers));
        contact = contact.layer(contact_rate_limiter(config.trust_proxy_headers));
    }

    Router::new()
        .route("/projects", get(projects::list))
        .merge(auth)
        .merge(contact)
}

/// Routes behind [`require_admin`].
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/session", get(admin::auth::session))
        .route("/admin/messages", get(admin::messages::list))
        .route("/admin/messages/{id}/read", patch(admin::messages::mark_read))
        .route("/admin/messages/{id}", delete(admin::messages::delete))
        .route("/admin/projects", post(admin::projects::create))
        .route(
            "/admin/projects/{id}",
            put(admin::projects::update).delete(admin::projects::delete),
        )
        .route("/admin/stats", get(admin::stats::stats))
        .route_layer(from_fn_with_state(state.clone(), require_admin))
}

/// The JSON API, to be nested under `/api`.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    public_routes(state.config())
        .merge(admin_routes(state))
        .fallback(|| async { AppError::not_found("Route") })
}

/// Liveness and readiness probes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
