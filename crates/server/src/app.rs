//! Full application router: API, probes, static site and middleware stack.

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware::from_fn,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::routes;
use crate::state::AppState;

/// Build the router with every layer applied.
pub fn router(state: AppState) -> Router {
    let static_files =
        ServeDir::new(&state.config().static_dir).append_index_html_on_directories(true);
    let cors = cors_layer(state.config().cors_allowed_origins.as_deref());

    Router::new()
        .merge(routes::health_routes())
        .nest("/api", routes::api_routes(&state))
        .fallback_service(static_files)
        .layer(cors)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for the JSON API. Auth travels in the `Authorization` header, never
/// in cookies, so credentials are not allowed cross-origin.
fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match allowed_origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| {
                    HeaderValue::from_str(origin)
                        .inspect_err(|_| tracing::warn!(%origin, "Ignoring invalid CORS origin"))
                        .ok()
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{body::to_bytes, http::StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use portfolio_core::{AdminId, AdminIdentity};

    use super::*;
    use crate::config::ServerConfig;
    use crate::db::MemoryStore;

    struct TestApp {
        router: Router,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            let state = AppState::new(
                ServerConfig::for_memory_store("router-test-signing-key"),
                Arc::new(MemoryStore::new()),
            );
            Self {
                router: router(state.clone()),
                state,
            }
        }

        fn token(&self) -> String {
            self.token_issued_at(Utc::now())
        }

        fn token_issued_at(&self, at: chrono::DateTime<Utc>) -> String {
            self.state
                .tokens()
                .issue_at(
                    &AdminIdentity {
                        id: AdminId::generate(),
                        username: "admin".to_owned(),
                    },
                    at,
                )
                .unwrap()
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }
    }

    fn contact() -> Value {
        json!({"name": "A", "email": "a@x.com", "subject": "Hi", "message": "Test"})
    }

    #[tokio::test]
    async fn test_contact_message_reaches_inbox() {
        let app = TestApp::new();
        let token = app.token();

        let (status, body) = app
            .send(Method::POST, "/api/messages", None, Some(contact()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Message sent successfully");

        let (status, inbox) = app
            .send(Method::GET, "/api/admin/messages", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let inbox = inbox.as_array().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["name"], "A");
        assert_eq!(inbox[0]["email"], "a@x.com");
        assert_eq!(inbox[0]["subject"], "Hi");
        assert_eq!(inbox[0]["message"], "Test");
        assert_eq!(inbox[0]["read"], false);
        assert!(inbox[0]["_id"].is_string());
        assert!(inbox[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_incomplete_contact_is_rejected_and_not_stored() {
        let app = TestApp::new();
        for field in ["name", "email", "subject", "message"] {
            let mut body = contact();
            body.as_object_mut().unwrap().remove(field);
            let (status, error) = app
                .send(Method::POST, "/api/messages", None, Some(body))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error["message"], "All fields are required");
        }

        let (_, stats) = app
            .send(Method::GET, "/api/admin/stats", Some(&app.token()), None)
            .await;
        assert_eq!(stats["totalMessages"], 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = TestApp::new();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_valid_token() {
        let app = TestApp::new();

        let (status, body) = app
            .send(Method::GET, "/api/admin/messages", None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access token required");

        let (status, body) = app
            .send(Method::GET, "/api/admin/stats", Some("not.a.token"), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or expired token");

        let expired = app.token_issued_at(Utc::now() - Duration::days(8));
        let (status, _) = app
            .send(Method::GET, "/api/admin/session", Some(&expired), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_setup_login_session_flow() {
        let app = TestApp::new();
        let credentials = json!({"username": "owner", "password": "password123"});

        let (status, body) = app
            .send(Method::POST, "/api/admin/setup", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Admin created successfully");

        let (status, body) = app
            .send(Method::POST, "/api/admin/setup", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Admin already exists");

        let (status, login) = app
            .send(Method::POST, "/api/admin/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["admin"]["username"], "owner");
        assert!(login["admin"]["email"].is_null());
        let token = login["token"].as_str().unwrap();

        let (status, session) = app
            .send(Method::GET, "/api/admin/session", Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["username"], "owner");
        assert_eq!(session["id"], login["admin"]["id"]);
    }

    #[tokio::test]
    async fn test_login_failures_share_one_body() {
        let app = TestApp::new();
        app.send(
            Method::POST,
            "/api/admin/setup",
            None,
            Some(json!({"username": "owner", "password": "password123"})),
        )
        .await;

        let (wrong_status, wrong_body) = app
            .send(
                Method::POST,
                "/api/admin/login",
                None,
                Some(json!({"username": "owner", "password": "wrong-password"})),
            )
            .await;
        let (unknown_status, unknown_body) = app
            .send(
                Method::POST,
                "/api/admin/login",
                None,
                Some(json!({"username": "nobody", "password": "password123"})),
            )
            .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
        assert_eq!(wrong_body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_mark_read_updates_stats_and_is_idempotent() {
        let app = TestApp::new();
        let token = app.token();
        app.send(Method::POST, "/api/messages", None, Some(contact()))
            .await;
        app.send(Method::POST, "/api/messages", None, Some(contact()))
            .await;

        let (_, inbox) = app
            .send(Method::GET, "/api/admin/messages", Some(&token), None)
            .await;
        let id = inbox[0]["_id"].as_str().unwrap().to_owned();
        let (_, before) = app
            .send(Method::GET, "/api/admin/stats", Some(&token), None)
            .await;
        assert_eq!(before["unreadMessages"], 2);

        let uri = format!("/api/admin/messages/{id}/read");
        for _ in 0..2 {
            let (status, message) = app.send(Method::PATCH, &uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(message["read"], true);
        }

        let (_, after) = app
            .send(Method::GET, "/api/admin/stats", Some(&token), None)
            .await;
        assert_eq!(after["unreadMessages"], 1);
        assert_eq!(after["totalMessages"], 2);
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let app = TestApp::new();
        let token = app.token();
        app.send(Method::POST, "/api/messages", None, Some(contact()))
            .await;
        let (_, inbox) = app
            .send(Method::GET, "/api/admin/messages", Some(&token), None)
            .await;
        let id = inbox[0]["_id"].as_str().unwrap().to_owned();

        let (status, body) = app
            .send(Method::DELETE, &format!("/api/admin/messages/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Message deleted");

        let (status, body) = app
            .send(Method::PATCH, &format!("/api/admin/messages/{id}/read"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Message not found");

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/admin/messages/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .send(Method::DELETE, "/api/admin/projects/not-a-uuid", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/admin/projects/{}", uuid::Uuid::new_v4()),
                Some(&token),
                Some(json!({"title": "T"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Project not found");
    }

    #[tokio::test]
    async fn test_project_crud_and_ordering() {
        let app = TestApp::new();
        let token = app.token();

        let (status, later) = app
            .send(
                Method::POST,
                "/api/admin/projects",
                Some(&token),
                Some(json!({"title": "Later", "description": "D", "order": 5})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(later["status"], "completed");
        assert_eq!(later["featured"], false);

        let (_, first) = app
            .send(
                Method::POST,
                "/api/admin/projects",
                Some(&token),
                Some(json!({
                    "title": "First",
                    "description": "D",
                    "order": 1,
                    "technologies": ["Rust"],
                    "liveUrl": "https://example.com",
                    "status": "in-progress"
                })),
            )
            .await;

        let (status, listed) = app.send(Method::GET, "/api/projects", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["First", "Later"]);

        let first_id = first["_id"].as_str().unwrap();
        let (status, updated) = app
            .send(
                Method::PUT,
                &format!("/api/admin/projects/{first_id}"),
                Some(&token),
                Some(json!({"featured": true, "liveUrl": ""})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["featured"], true);
        assert_eq!(updated["title"], "First");
        assert_eq!(updated["technologies"], json!(["Rust"]));
        assert!(updated.get("liveUrl").is_none());

        let (status, body) = app
            .send(
                Method::DELETE,
                &format!("/api/admin/projects/{first_id}"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Project deleted");

        let (_, stats) = app
            .send(Method::GET, "/api/admin/stats", Some(&token), None)
            .await;
        assert_eq!(stats["totalProjects"], 1);
    }

    #[tokio::test]
    async fn test_invalid_project_is_bad_request() {
        let app = TestApp::new();
        let token = app.token();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/admin/projects",
                Some(&token),
                Some(json!({"description": "no title"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Title is required");

        let (status, _) = app
            .send(
                Method::POST,
                "/api/admin/projects",
                Some(&token),
                Some(json!({"title": "T", "description": "D", "status": "abandoned"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_probes_and_headers() {
        let app = TestApp::new();
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");

        let (status, body) = app.send(Method::GET, "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Route not found");
    }
}
