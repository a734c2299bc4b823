//! Admin console commands.
//!
//! The session is kept in `PORTFOLIO_SESSION_FILE` (default
//! `.portfolio-session.json`) and revalidated on every run.
//!
//! # Usage
//!
//! ```bash
//! PORTFOLIO_ADMIN_PASSWORD=... portfolio-cli console login -u admin
//! portfolio-cli console messages --filter unread
//! portfolio-cli console show <MESSAGE_ID>
//! portfolio-cli console save-project --title "New" --description "..." --technologies "Rust, axum"
//! portfolio-cli console delete-project <PROJECT_ID> --yes
//! ```

use portfolio_client::admin::{CatalogSnapshot, InboxSnapshot};
use portfolio_client::{AdminConsole, ClientError, FileSessionStore, MessageFilter, ProjectForm};
use portfolio_core::{DashboardStats, Message, MessageId, Project, ProjectId, ProjectStatus};
use secrecy::{ExposeSecret, SecretString};

pub type Console = AdminConsole<FileSessionStore>;

/// Fields given on the command line for `save-project`.
///
/// On update, unset fields keep the stored value.
#[derive(Debug, Default)]
pub struct ProjectEdits {
    pub id: Option<ProjectId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    pub technologies: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
    pub order: Option<i32>,
}

impl ProjectEdits {
    /// Apply the edits over a prefilled form.
    #[must_use]
    pub fn apply(self, mut form: ProjectForm) -> ProjectForm {
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.features {
            form.features = v;
        }
        if let Some(v) = self.technologies {
            form.technologies = v;
        }
        if let Some(v) = self.live_url {
            form.live_url = v;
        }
        if let Some(v) = self.github_url {
            form.github_url = v;
        }
        if let Some(v) = self.image_url {
            form.image_url = v;
        }
        if let Some(v) = self.featured {
            form.featured = v;
        }
        if let Some(v) = self.status {
            form.status = v;
        }
        if let Some(v) = self.order {
            form.order = v;
        }
        form
    }
}

/// Revalidate the stored session, failing if there is none.
async fn require_session(console: &mut Console) -> Result<(), ClientError> {
    match console.restore().await? {
        Some(_) => Ok(()),
        None => Err(ClientError::NotLoggedIn),
    }
}

fn confirm(yes: bool, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    if yes {
        Ok(())
    } else {
        Err(format!("refusing to delete {what} without --yes").into())
    }
}

/// # Errors
///
/// Returns an error for bad credentials or an unwritable session file.
pub async fn login(
    console: &mut Console,
    username: &str,
    password: &SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    let admin = console.login(username, password.expose_secret()).await?;
    print_line(&format!("Logged in as {}", admin.username));
    tracing::info!(path = %console.session_store().path().display(), "Session stored");
    Ok(())
}

/// # Errors
///
/// Returns an error if the session file cannot be removed.
pub fn logout(console: &mut Console) -> Result<(), Box<dyn std::error::Error>> {
    console.logout()?;
    print_line("Logged out");
    Ok(())
}

/// # Errors
///
/// Returns an error if the server cannot be reached.
pub async fn status(console: &mut Console) -> Result<(), Box<dyn std::error::Error>> {
    match console.restore().await? {
        Some(identity) => print_line(&format!("Logged in as {}", identity.username)),
        None => print_line("Logged out"),
    }
    Ok(())
}

/// Dashboard: stats plus the five most recent messages.
///
/// # Errors
///
/// Returns an error if not logged in or the session has expired.
pub async fn stats(console: &mut Console) -> Result<(), Box<dyn std::error::Error>> {
    require_session(console).await?;
    let dashboard = console.refresh().await?;
    print_stats(&dashboard.stats);
    print_line("\nRecent messages:");
    if dashboard.recent_messages().is_empty() {
        print_line("  (none)");
    }
    for message in dashboard.recent_messages() {
        print_message_row(message);
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the session has expired.
pub async fn messages(
    console: &mut Console,
    filter: MessageFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    require_session(console).await?;
    let inbox = console.inbox().await?;
    print_inbox(&inbox, filter);
    Ok(())
}

/// # Errors
///
/// Returns an error if the message does not exist.
pub async fn show(console: &mut Console, id: MessageId) -> Result<(), Box<dyn std::error::Error>> {
    require_session(console).await?;
    let opened = console.open_message(id).await?;
    print_message_detail(&opened.message);
    if let Some(inbox) = opened.inbox {
        print_stats(&inbox.stats);
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the message does not exist.
pub async fn read(console: &mut Console, id: MessageId) -> Result<(), Box<dyn std::error::Error>> {
    require_session(console).await?;
    let inbox = console.mark_read(id).await?;
    print_inbox(&inbox, MessageFilter::All);
    Ok(())
}

/// # Errors
///
/// Returns an error without `--yes` or if the message does not exist.
pub async fn delete_message(
    console: &mut Console,
    id: MessageId,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    confirm(yes, "message")?;
    require_session(console).await?;
    let inbox = console.delete_message(id).await?;
    print_line("Message deleted");
    print_inbox(&inbox, MessageFilter::All);
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the session has expired.
pub async fn projects(console: &mut Console) -> Result<(), Box<dyn std::error::Error>> {
    require_session(console).await?;
    let catalog = console.catalog().await?;
    print_catalog(&catalog);
    Ok(())
}

/// Create a project, or update the one named by `--id`.
///
/// # Errors
///
/// Returns an error if the project does not exist or the server rejects
/// the fields.
pub async fn save_project(
    console: &mut Console,
    edits: ProjectEdits,
) -> Result<(), Box<dyn std::error::Error>> {
    require_session(console).await?;

    let base = match edits.id {
        Some(id) => {
            let catalog = console.catalog().await?;
            let existing = catalog
                .projects
                .iter()
                .find(|p| p.id == id)
                .ok_or(ClientError::NotFound { what: "Project" })?;
            ProjectForm::from_project(existing)
        }
        None => ProjectForm::default(),
    };

    let (project, catalog) = console.save_project(&edits.apply(base)).await?;
    print_line(&format!("Saved project {} ({})", project.title, project.id));
    print_catalog(&catalog);
    Ok(())
}

/// # Errors
///
/// Returns an error without `--yes` or if the project does not exist.
pub async fn delete_project(
    console: &mut Console,
    id: ProjectId,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    confirm(yes, "project")?;
    require_session(console).await?;
    let catalog = console.delete_project(id).await?;
    print_line("Project deleted");
    print_catalog(&catalog);
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

#[allow(clippy::print_stdout)]
fn print_line(text: &str) {
    println!("{text}");
}

#[allow(clippy::print_stdout)]
fn print_stats(stats: &DashboardStats) {
    println!(
        "Messages: {} ({} unread)  Projects: {}",
        stats.total_messages, stats.unread_messages, stats.total_projects
    );
}

#[allow(clippy::print_stdout)]
fn print_message_row(message: &Message) {
    let marker = if message.read { " " } else { "*" };
    println!(
        "{marker} {}  {}  {} <{}>  {}",
        message.id,
        message.created_at.format("%Y-%m-%d %H:%M"),
        message.name,
        message.email,
        message.subject
    );
}

#[allow(clippy::print_stdout)]
fn print_message_detail(message: &Message) {
    println!("From:    {} <{}>", message.name, message.email);
    println!("Date:    {}", message.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Subject: {}", message.subject);
    println!();
    println!("{}", message.message);
    println!();
}

fn print_inbox(inbox: &InboxSnapshot, filter: MessageFilter) {
    print_stats(&inbox.stats);
    let messages = inbox.messages(filter);
    if messages.is_empty() {
        print_line("No messages");
    }
    for message in messages {
        print_message_row(message);
    }
}

#[allow(clippy::print_stdout)]
fn print_project_row(project: &Project) {
    let featured = if project.featured { "featured" } else { "" };
    println!(
        "{:>3}  {}  {}  [{}] {featured}",
        project.order, project.id, project.title, project.status
    );
}

fn print_catalog(catalog: &CatalogSnapshot) {
    print_stats(&catalog.stats);
    for project in &catalog.projects {
        print_project_row(project);
    }
}
