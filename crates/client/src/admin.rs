//! Admin console: session handling, inbox triage and project editing.
//!
//! Every mutating action refetches the affected list together with the stats
//! summary, so callers always render server state. A 401/403 on any call
//! clears the stored session and surfaces as `ClientError::SessionExpired`.

use portfolio_core::{
    AdminIdentity, AdminProfile, DashboardStats, LoginRequest, Message, MessageId, Project,
    ProjectId, ProjectInput, ProjectStatus,
};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::session::{SessionStore, StoredSession};

/// How many messages the dashboard's recent panel shows.
pub const RECENT_MESSAGES: usize = 5;

/// Inbox view selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl MessageFilter {
    #[must_use]
    pub const fn matches(self, message: &Message) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !message.read,
            Self::Read => message.read,
        }
    }
}

impl std::str::FromStr for MessageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            _ => Err(format!("unknown message filter: {s}")),
        }
    }
}

fn filtered(messages: &[Message], filter: MessageFilter) -> Vec<&Message> {
    messages.iter().filter(|m| filter.matches(m)).collect()
}

/// Everything the dashboard renders, fetched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    /// Newest first, as returned by the server.
    pub messages: Vec<Message>,
    pub projects: Vec<Project>,
}

impl Dashboard {
    #[must_use]
    pub fn messages(&self, filter: MessageFilter) -> Vec<&Message> {
        filtered(&self.messages, filter)
    }

    #[must_use]
    pub fn recent_messages(&self) -> &[Message] {
        let end = self.messages.len().min(RECENT_MESSAGES);
        self.messages.get(..end).unwrap_or_default()
    }
}

/// Messages and stats after an inbox change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxSnapshot {
    pub messages: Vec<Message>,
    pub stats: DashboardStats,
}

impl InboxSnapshot {
    #[must_use]
    pub fn messages(&self, filter: MessageFilter) -> Vec<&Message> {
        filtered(&self.messages, filter)
    }
}

/// Projects and stats after a catalog change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub projects: Vec<Project>,
    pub stats: DashboardStats,
}

/// A message opened in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    pub message: Message,
    /// Refetched inbox when opening changed the read flag.
    pub inbox: Option<InboxSnapshot>,
}

/// The project editor's fields as typed.
///
/// Features and technologies are comma-separated free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    /// `None` for a new project.
    pub id: Option<ProjectId>,
    pub title: String,
    pub description: String,
    pub features: String,
    pub technologies: String,
    pub live_url: String,
    pub github_url: String,
    pub image_url: String,
    pub featured: bool,
    pub status: ProjectStatus,
    pub order: i32,
}

impl ProjectForm {
    /// Prefill the editor from a stored project.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: Some(project.id),
            title: project.title.clone(),
            description: project.description.clone(),
            features: project.features.join(", "),
            technologies: project.technologies.join(", "),
            live_url: project.live_url.clone().unwrap_or_default(),
            github_url: project.github_url.clone().unwrap_or_default(),
            image_url: project.image_url.clone().unwrap_or_default(),
            featured: project.featured,
            status: project.status,
            order: project.order,
        }
    }

    /// The request body for this form.
    #[must_use]
    pub fn to_input(&self) -> ProjectInput {
        let editing = self.id.is_some();
        let url = |value: &str| {
            let value = value.trim();
            if !value.is_empty() {
                Some(Some(value.to_owned()))
            } else if editing {
                Some(None)
            } else {
                None
            }
        };

        ProjectInput {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            features: Some(split_list(&self.features)),
            technologies: Some(split_list(&self.technologies)),
            live_url: url(&self.live_url),
            github_url: url(&self.github_url),
            image_url: url(&self.image_url),
            featured: Some(self.featured),
            status: Some(self.status),
            order: Some(self.order),
        }
    }
}

/// Split comma-separated text, trimming entries and dropping empty ones.
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Client logic behind the admin console.
pub struct AdminConsole<S: SessionStore> {
    api: ApiClient,
    store: S,
    session: Option<StoredSession>,
}

impl<S: SessionStore> AdminConsole<S> {
    /// Create a logged-out console. Call [`Self::restore`] to pick up a stored session.
    #[must_use]
    pub const fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            session: None,
        }
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub const fn session_store(&self) -> &S {
        &self.store
    }

    /// Revalidate a stored token with the server.
    ///
    /// Returns `None` when there is no stored session or the server rejects
    /// it; a rejected session is removed from the store.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the store cannot be read or the server cannot
    /// be reached.
    pub async fn restore(&mut self) -> Result<Option<AdminIdentity>, ClientError> {
        let Some(stored) = self.store.load()? else {
            self.session = None;
            return Ok(None);
        };

        match self.api.session(&stored.token).await {
            Ok(identity) => {
                tracing::debug!(username = %identity.username, "Session restored");
                self.session = Some(StoredSession {
                    token: stored.token,
                    username: identity.username.clone(),
                });
                Ok(Some(identity))
            }
            Err(e) if e.is_auth_failure() => {
                tracing::info!("Stored session rejected; logging out");
                self.forget()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Log in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for bad credentials.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AdminProfile, ClientError> {
        let response = self
            .api
            .login(&LoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .await?;

        let session = StoredSession {
            token: response.token,
            username: response.admin.username.clone(),
        };
        self.store.save(&session)?;
        self.session = Some(session);
        Ok(response.admin)
    }

    /// Drop the session locally. Tokens are not revoked server-side.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the store cannot be cleared.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.forget()
    }

    fn forget(&mut self) -> Result<(), ClientError> {
        self.session = None;
        self.store.clear()
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ClientError::NotLoggedIn)
    }

    /// Map a 401/403 to `SessionExpired`, clearing the session.
    fn checked<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match result {
            Err(e) if e.is_auth_failure() => {
                tracing::info!(error = %e, "Session rejected by server");
                self.forget()?;
                Err(ClientError::SessionExpired)
            }
            other => other,
        }
    }

    /// Load stats, messages and projects.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::SessionExpired` if the token is rejected.
    pub async fn refresh(&mut self) -> Result<Dashboard, ClientError> {
        let token = self.token()?;
        let result = tokio::try_join!(
            self.api.stats(&token),
            self.api.list_messages(&token),
            self.api.list_projects(),
        );
        let (stats, messages, projects) = self.checked(result)?;
        Ok(Dashboard {
            stats,
            messages,
            projects,
        })
    }

    /// Messages and stats.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::SessionExpired` if the token is rejected.
    pub async fn inbox(&mut self) -> Result<InboxSnapshot, ClientError> {
        let token = self.token()?;
        let result = tokio::try_join!(self.api.list_messages(&token), self.api.stats(&token));
        let (messages, stats) = self.checked(result)?;
        Ok(InboxSnapshot { messages, stats })
    }

    /// Projects and stats.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::SessionExpired` if the token is rejected.
    pub async fn catalog(&mut self) -> Result<CatalogSnapshot, ClientError> {
        let token = self.token()?;
        let result = tokio::try_join!(self.api.list_projects(), self.api.stats(&token));
        let (projects, stats) = self.checked(result)?;
        Ok(CatalogSnapshot { projects, stats })
    }

    /// Show one message, marking it read first if needed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no message has this id.
    pub async fn open_message(&mut self, id: MessageId) -> Result<OpenedMessage, ClientError> {
        let token = self.token()?;
        let result = self.api.list_messages(&token).await;
        let message = self
            .checked(result)?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or(ClientError::NotFound { what: "Message" })?;

        if message.read {
            return Ok(OpenedMessage {
                message,
                inbox: None,
            });
        }

        let result = self.api.mark_message_read(&token, id).await;
        let message = self.checked(result)?;
        let inbox = self.inbox().await?;
        Ok(OpenedMessage {
            message,
            inbox: Some(inbox),
        })
    }

    /// Mark a message read.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the message is gone.
    pub async fn mark_read(&mut self, id: MessageId) -> Result<InboxSnapshot, ClientError> {
        let token = self.token()?;
        let result = self.api.mark_message_read(&token, id).await;
        self.checked(result)?;
        self.inbox().await
    }

    /// Delete a message. Asking for confirmation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the message is gone.
    pub async fn delete_message(&mut self, id: MessageId) -> Result<InboxSnapshot, ClientError> {
        let token = self.token()?;
        let result = self.api.delete_message(&token, id).await;
        self.checked(result)?;
        self.inbox().await
    }

    /// Create the project when the form has no id, update it otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 for invalid fields.
    pub async fn save_project(
        &mut self,
        form: &ProjectForm,
    ) -> Result<(Project, CatalogSnapshot), ClientError> {
        let token = self.token()?;
        let input = form.to_input();
        let result = match form.id {
            Some(id) => self.api.update_project(&token, id, &input).await,
            None => self.api.create_project(&token, &input).await,
        };
        let project = self.checked(result)?;
        tracing::debug!(project_id = %project.id, "Project saved");
        let catalog = self.catalog().await?;
        Ok((project, catalog))
    }

    /// Delete a project. Asking for confirmation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the project is gone.
    pub async fn delete_project(&mut self, id: ProjectId) -> Result<CatalogSnapshot, ClientError> {
        let token = self.token()?;
        let result = self.api.delete_project(&token, id).await;
        self.checked(result)?;
        self.catalog().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::session::MemorySessionStore;

    fn message(read: bool, minutes_ago: i64) -> Message {
        Message {
            id: MessageId::generate(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            subject: "Hello".to_owned(),
            message: "Hi there".to_owned(),
            read,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn project() -> Project {
        Project {
            id: ProjectId::generate(),
            title: "BA-Tours".to_owned(),
            description: "Bookings".to_owned(),
            features: vec!["Bookings".to_owned(), "Reports".to_owned()],
            technologies: vec!["Rust".to_owned()],
            live_url: Some("https://example.com".to_owned()),
            github_url: None,
            image_url: None,
            featured: true,
            status: ProjectStatus::Completed,
            order: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" Rust, axum ,, ,sqlx,"),
            vec!["Rust".to_owned(), "axum".to_owned(), "sqlx".to_owned()]
        );
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_new_form_omits_empty_urls() {
        let form = ProjectForm {
            title: "New".to_owned(),
            description: "Thing".to_owned(),
            live_url: "  ".to_owned(),
            github_url: "https://github.com/example/new".to_owned(),
            ..ProjectForm::default()
        };
        let input = form.to_input();
        assert_eq!(input.live_url, None);
        assert_eq!(
            input.github_url,
            Some(Some("https://github.com/example/new".to_owned()))
        );

        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("liveUrl").is_none());
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_edit_form_clears_emptied_urls() {
        let stored = project();
        let mut form = ProjectForm::from_project(&stored);
        assert_eq!(form.features, "Bookings, Reports");
        assert_eq!(form.live_url, "https://example.com");

        form.live_url.clear();
        let input = form.to_input();
        assert_eq!(input.live_url, Some(None));
        assert_eq!(input.features, Some(stored.features));

        let json = serde_json::to_value(&input).unwrap();
        assert!(json["liveUrl"].is_null());
    }

    #[test]
    fn test_message_filters_and_recent_panel() {
        let messages: Vec<Message> = (0..7).map(|i| message(i % 2 == 0, i)).collect();
        let dashboard = Dashboard {
            stats: DashboardStats::default(),
            messages: messages.clone(),
            projects: Vec::new(),
        };

        assert_eq!(dashboard.messages(MessageFilter::All).len(), 7);
        assert_eq!(dashboard.messages(MessageFilter::Read).len(), 4);
        assert_eq!(dashboard.messages(MessageFilter::Unread).len(), 3);
        assert_eq!(dashboard.recent_messages(), &messages[..5]);
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("unread".parse(), Ok(MessageFilter::Unread));
        assert!("archived".parse::<MessageFilter>().is_err());
    }

    #[tokio::test]
    async fn test_actions_require_login() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut console = AdminConsole::new(api, MemorySessionStore::new());

        assert!(!console.is_logged_in());
        assert!(matches!(
            console.refresh().await,
            Err(ClientError::NotLoggedIn)
        ));
        assert!(console.restore().await.unwrap().is_none());
    }
}
