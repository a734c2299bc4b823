//! Portfolio projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ValidationError, double_option, is_blank};
use crate::{ProjectId, ProjectStatus};

/// A stored portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Build a stored project from its validated fields.
    #[must_use]
    pub fn from_new(id: ProjectId, created_at: DateTime<Utc>, fields: NewProject) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            features: fields.features,
            technologies: fields.technologies,
            live_url: fields.live_url,
            github_url: fields.github_url,
            image_url: fields.image_url,
            featured: fields.featured,
            status: fields.status,
            order: fields.order,
            created_at,
        }
    }
}

/// Body of `POST /api/admin/projects` and `PUT /api/admin/projects/{id}`.
///
/// On create, omitted fields take their defaults. On update, omitted fields
/// keep their stored value; the URL fields can be cleared with `null` or `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub live_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// The validated, storable fields of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub status: ProjectStatus,
    pub order: i32,
}

impl ProjectInput {
    /// Validate the input as a brand new project.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the title or description is missing or a
    /// URL is malformed.
    pub fn into_new_project(self) -> Result<NewProject, ValidationError> {
        if is_blank(self.title.as_deref()) {
            return Err(ValidationError::new("Title is required"));
        }
        if is_blank(self.description.as_deref()) {
            return Err(ValidationError::new("Description is required"));
        }

        NewProject {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            features: self.features.unwrap_or_default(),
            technologies: self.technologies.unwrap_or_default(),
            live_url: self.live_url.flatten(),
            github_url: self.github_url.flatten(),
            image_url: self.image_url.flatten(),
            featured: self.featured.unwrap_or(false),
            status: self.status.unwrap_or_default(),
            order: self.order.unwrap_or(0),
        }
        .normalized()
    }

    /// Merge the supplied fields over an existing project.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the merged result breaks a field invariant.
    pub fn merge_into(self, existing: &Project) -> Result<NewProject, ValidationError> {
        NewProject {
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            features: self
                .features
                .unwrap_or_else(|| existing.features.clone()),
            technologies: self
                .technologies
                .unwrap_or_else(|| existing.technologies.clone()),
            live_url: self
                .live_url
                .unwrap_or_else(|| existing.live_url.clone()),
            github_url: self
                .github_url
                .unwrap_or_else(|| existing.github_url.clone()),
            image_url: self
                .image_url
                .unwrap_or_else(|| existing.image_url.clone()),
            featured: self.featured.unwrap_or(existing.featured),
            status: self.status.unwrap_or(existing.status),
            order: self.order.unwrap_or(existing.order),
        }
        .normalized()
    }
}

impl NewProject {
    fn normalized(self) -> Result<Self, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("Title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::new("Description is required"));
        }

        Ok(Self {
            features: clean_list(self.features),
            technologies: clean_list(self.technologies),
            live_url: clean_url(self.live_url, "liveUrl")?,
            github_url: clean_url(self.github_url, "githubUrl")?,
            image_url: clean_url(self.image_url, "imageUrl")?,
            ..self
        })
    }
}

/// Trim entries and drop the empty ones, keeping order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Blank URLs become absent; anything else must be an absolute http(s) URL.
fn clean_url(value: Option<String>, field: &str) -> Result<Option<String>, ValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(trimmed.to_owned())),
        _ => Err(ValidationError::new(format!(
            "{field} must be an absolute http(s) URL"
        ))),
    }
}
