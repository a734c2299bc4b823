//! One-time bootstrap: default admin and sample projects.
//!
//! # Usage
//!
//! ```bash
//! # Built-in sample projects
//! portfolio-cli setup
//!
//! # Projects from a YAML list of project objects
//! portfolio-cli setup --projects projects.yaml
//! ```

use std::path::Path;

use portfolio_core::ProjectInput;
use portfolio_server::ServerConfig;
use portfolio_server::db;
use portfolio_server::services::bootstrap::{
    self, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, SeedReport,
};
use tracing::{info, warn};

/// Read a YAML list of projects.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a list of projects.
pub async fn load_projects(path: &Path) -> Result<Vec<ProjectInput>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    info!(path = %path.display(), "Loading projects from file");
    let content = tokio::fs::read_to_string(path).await?;
    let projects: Vec<ProjectInput> = serde_yaml::from_str(&content)?;
    info!(projects = projects.len(), "Parsed projects");
    Ok(projects)
}

/// Seed the configured store.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the project file cannot
/// be read, or the store rejects a write.
pub async fn run(projects_file: Option<&Path>) -> Result<SeedReport, Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    config.log_defaults();

    let projects = match projects_file {
        Some(path) => load_projects(path).await?,
        None => bootstrap::sample_projects(),
    };

    let store = db::connect(&config).await?;
    let report = bootstrap::seed(store.as_ref(), projects).await?;

    if report.admin_created {
        warn!(
            "Default admin created: {DEFAULT_ADMIN_USERNAME} / {DEFAULT_ADMIN_PASSWORD}. \
             Change this password after first login!"
        );
    }
    info!("Setup complete!");
    info!("  Admin created: {}", report.admin_created);
    info!("  Projects created: {}", report.projects_created);

    Ok(report)
}
