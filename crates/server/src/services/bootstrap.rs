//! One-time initialization: default admin and sample projects.
//!
//! Each half runs only when its table is empty, so seeding is idempotent.

use portfolio_core::{Email, ProjectInput, ProjectStatus, ValidationError};

use super::auth::{AuthError, register_first_admin};
use crate::db::{RepositoryError, Store};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@portfolio.com";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("admin creation failed: {0}")]
    Auth(#[from] AuthError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid seed project #{index}: {source}")]
    InvalidProject {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

/// What a seed run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub projects_created: usize,
}

/// Create the default admin if no admin exists, then insert `projects` if no
/// project exists.
///
/// Projects are validated up front, so a bad entry inserts nothing.
///
/// # Errors
///
/// Returns `BootstrapError::InvalidProject` for a project that fails
/// validation, or a store error.
pub async fn seed(
    store: &dyn Store,
    projects: Vec<ProjectInput>,
) -> Result<SeedReport, BootstrapError> {
    let mut report = SeedReport::default();

    if store.count_admins().await? == 0 {
        let email = Email::parse(DEFAULT_ADMIN_EMAIL).ok();
        match register_first_admin(
            store,
            DEFAULT_ADMIN_USERNAME.to_owned(),
            DEFAULT_ADMIN_PASSWORD.to_owned(),
            email,
        )
        .await
        {
            Ok(_) => {
                report.admin_created = true;
                tracing::warn!(
                    username = DEFAULT_ADMIN_USERNAME,
                    "Default admin created; change its password after first login"
                );
            }
            // Lost a race with a concurrent setup
            Err(AuthError::AdminExists) => {}
            Err(e) => return Err(e.into()),
        }
    } else {
        tracing::info!("Admin account already exists");
    }

    if store.count_projects().await? == 0 {
        let validated = projects
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                input
                    .into_new_project()
                    .map_err(|source| BootstrapError::InvalidProject { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for project in validated {
            let created = store.create_project(project).await?;
            tracing::info!(project_id = %created.id, title = %created.title, "Seeded project");
            report.projects_created += 1;
        }
    } else {
        tracing::info!("Projects already exist");
    }

    Ok(report)
}

/// The built-in sample projects.
#[must_use]
pub fn sample_projects() -> Vec<ProjectInput> {
    let strings = |items: &[&str]| items.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();

    vec![
        ProjectInput {
            title: Some("BA-Tours Management & Booking System".to_owned()),
            description: Some(
                "A full-featured web platform for managing tours and bookings, built for a local \
                 tour company. Includes both Admin and Client Dashboards."
                    .to_owned(),
            ),
            features: Some(strings(&[
                "🧾 Bookings & Reports",
                "💰 Financial Records",
                "📦 Inventory Management",
                "👤 User Management",
            ])),
            technologies: Some(strings(&[
                "HTML",
                "CSS",
                "JavaScript",
                "Node.js",
                "Express",
                "MongoDB",
            ])),
            live_url: Some(Some(
                "https://codewithshadyy.github.io/BA-tours-rentals/".to_owned(),
            )),
            featured: Some(true),
            status: Some(ProjectStatus::Completed),
            order: Some(1),
            ..ProjectInput::default()
        },
        ProjectInput {
            title: Some("Low-Data App for Local Creatives".to_owned()),
            description: Some(
                "A lightweight platform designed to empower local creatives in rural Kenya, \
                 helping them share and sell their art with limited internet access."
                    .to_owned(),
            ),
            features: Some(strings(&[
                "🌍 Rural-Focused",
                "⚡ Speed Optimized",
                "♿ Accessibility",
                "📱 Mobile-First",
            ])),
            technologies: Some(strings(&["Node.js", "Express", "MongoDB"])),
            featured: Some(false),
            status: Some(ProjectStatus::InProgress),
            order: Some(2),
            ..ProjectInput::default()
        },
    ]
}
