//! Typed wrapper over the portfolio JSON API.

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use portfolio_core::{
    AdminIdentity, ApiMessage, DashboardStats, LoginRequest, LoginResponse, Message, MessageId,
    Project, ProjectId, ProjectInput, SetupRequest,
};

use crate::error::ClientError;

/// HTTP client bound to one server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:2005`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base.join(path)?;
        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    // =========================================================================
    // Public endpoints
    // =========================================================================

    /// GET /api/projects
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a non-2xx status.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        send(self.request(Method::GET, "api/projects")?).await
    }

    /// POST /api/messages
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a non-2xx status.
    pub async fn submit_message<T: Serialize + Sync>(
        &self,
        submission: &T,
    ) -> Result<ApiMessage, ClientError> {
        send(self.request(Method::POST, "api/messages")?.json(submission)).await
    }

    /// POST /api/admin/login
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for bad credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        send(self.request(Method::POST, "api/admin/login")?.json(request)).await
    }

    /// POST /api/admin/setup
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 once an admin exists.
    pub async fn setup(&self, request: &SetupRequest) -> Result<ApiMessage, ClientError> {
        send(self.request(Method::POST, "api/admin/setup")?.json(request)).await
    }

    // =========================================================================
    // Admin endpoints
    // =========================================================================

    /// GET /api/admin/session
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401/403 for a missing or bad token.
    pub async fn session(&self, token: &str) -> Result<AdminIdentity, ClientError> {
        send(self.authed(Method::GET, "api/admin/session", token)?).await
    }

    /// GET /api/admin/messages
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a non-2xx status.
    pub async fn list_messages(&self, token: &str) -> Result<Vec<Message>, ClientError> {
        send(self.authed(Method::GET, "api/admin/messages", token)?).await
    }

    /// PATCH /api/admin/messages/{id}/read
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the message is gone.
    pub async fn mark_message_read(
        &self,
        token: &str,
        id: MessageId,
    ) -> Result<Message, ClientError> {
        let path = format!("api/admin/messages/{id}/read");
        send(self.authed(Method::PATCH, &path, token)?).await
    }

    /// DELETE /api/admin/messages/{id}
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the message is gone.
    pub async fn delete_message(
        &self,
        token: &str,
        id: MessageId,
    ) -> Result<ApiMessage, ClientError> {
        let path = format!("api/admin/messages/{id}");
        send(self.authed(Method::DELETE, &path, token)?).await
    }

    /// POST /api/admin/projects
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 for invalid fields.
    pub async fn create_project(
        &self,
        token: &str,
        input: &ProjectInput,
    ) -> Result<Project, ClientError> {
        send(
            self.authed(Method::POST, "api/admin/projects", token)?
                .json(input),
        )
        .await
    }

    /// PUT /api/admin/projects/{id}
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the project is gone.
    pub async fn update_project(
        &self,
        token: &str,
        id: ProjectId,
        input: &ProjectInput,
    ) -> Result<Project, ClientError> {
        let path = format!("api/admin/projects/{id}");
        send(self.authed(Method::PUT, &path, token)?.json(input)).await
    }

    /// DELETE /api/admin/projects/{id}
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the project is gone.
    pub async fn delete_project(
        &self,
        token: &str,
        id: ProjectId,
    ) -> Result<ApiMessage, ClientError> {
        let path = format!("api/admin/projects/{id}");
        send(self.authed(Method::DELETE, &path, token)?).await
    }

    /// GET /api/admin/stats
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a non-2xx status.
    pub async fn stats(&self, token: &str) -> Result<DashboardStats, ClientError> {
        send(self.authed(Method::GET, "api/admin/stats", token)?).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let response = error_for_status(response).await?;
    Ok(response.json().await?)
}

/// Turn a non-2xx response into `ClientError::Api`, keeping the server's
/// `{"message"}` when there is one.
async fn error_for_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned();
    let message = response
        .json::<ApiMessage>()
        .await
        .map_or(fallback, |body| body.message);

    tracing::debug!(status = status.as_u16(), %message, "API request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
