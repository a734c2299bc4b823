//! Public site: project cards and the contact form.

use std::time::Duration;

use portfolio_core::{ContactSubmission, Project, ProjectStatus};

use crate::api::ApiClient;
use crate::error::ClientError;

/// How long a success banner stays visible.
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(5);

/// How long an error banner stays visible.
pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(5);

pub const CONTACT_SUCCESS_TEXT: &str = "Message sent successfully! I'll get back to you soon.";
pub const CONTACT_FAILURE_TEXT: &str = "Failed to send message. Please try again.";

/// The live-demo slot on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveLink {
    Url(String),
    ComingSoon,
}

/// View model for one project on the public page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCard {
    pub title: String,
    pub description: String,
    /// Empty when the project lists no features; the badge row is omitted.
    pub features: Vec<String>,
    pub technologies: Vec<String>,
    pub live: LiveLink,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub in_progress: bool,
}

impl From<Project> for ProjectCard {
    fn from(project: Project) -> Self {
        Self {
            title: project.title,
            description: project.description,
            features: project.features,
            technologies: project.technologies,
            live: project
                .live_url
                .filter(|url| !url.trim().is_empty())
                .map_or(LiveLink::ComingSoon, LiveLink::Url),
            source_url: project.github_url.filter(|url| !url.trim().is_empty()),
            image_url: project.image_url.filter(|url| !url.trim().is_empty()),
            featured: project.featured,
            in_progress: project.status == ProjectStatus::InProgress,
        }
    }
}

impl ProjectCard {
    #[must_use]
    pub fn has_features(&self) -> bool {
        !self.features.is_empty()
    }
}

/// The contact form's field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.email.is_empty()
            && self.subject.is_empty()
            && self.message.is_empty()
    }

    fn to_submission(&self) -> ContactSubmission {
        ContactSubmission {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            subject: Some(self.subject.clone()),
            message: Some(self.message.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// A transient notice shown above the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub auto_hide_after: Option<Duration>,
}

impl Banner {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
            auto_hide_after: Some(SUCCESS_BANNER_TTL),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
            auto_hide_after: Some(ERROR_BANNER_TTL),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.kind, BannerKind::Success)
    }
}

/// Client logic behind the public page.
#[derive(Debug, Clone)]
pub struct PublicSite {
    api: ApiClient,
}

impl PublicSite {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the project list in display order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the list cannot be fetched.
    pub async fn load_projects(&self) -> Result<Vec<ProjectCard>, ClientError> {
        let projects = self.api.list_projects().await?;
        Ok(projects.into_iter().map(ProjectCard::from).collect())
    }

    /// Send the form as one request.
    ///
    /// On success the form is cleared; on any failure it is left as typed.
    pub async fn submit_contact(&self, form: &mut ContactForm) -> Banner {
        match self.api.submit_message(&form.to_submission()).await {
            Ok(_) => {
                *form = ContactForm::default();
                Banner::success(CONTACT_SUCCESS_TEXT)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Contact submission failed");
                Banner::error(CONTACT_FAILURE_TEXT)
            }
        }
    }
}
