//! Portfolio CLI - migrations, bootstrap and the admin console.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! portfolio-cli migrate
//!
//! # Create the default admin and sample projects (idempotent)
//! portfolio-cli setup
//!
//! # Browse the public site
//! portfolio-cli site projects
//! portfolio-cli site contact -n "Ada" -e ada@example.com -s "Hello" -m "Nice work"
//!
//! # Admin console
//! PORTFOLIO_ADMIN_PASSWORD=... portfolio-cli console login -u admin
//! portfolio-cli console stats
//! ```
//!
//! # Environment Variables
//!
//! - `PORTFOLIO_URL` - Server base URL (default `http://127.0.0.1:2005`)
//! - `PORTFOLIO_SESSION_FILE` - Console session file (default `.portfolio-session.json`)
//! - `PORTFOLIO_ADMIN_PASSWORD` - Password for `console login` when `-p` is omitted
//! - `DATABASE_URL`, `JWT_SECRET`, ... - Server configuration for `migrate` and `setup`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portfolio_client::{
    AdminConsole, ApiClient, ContactForm, FileSessionStore, MessageFilter, PublicSite,
};
use portfolio_core::{MessageId, ProjectId, ProjectStatus};
use secrecy::SecretString;

mod commands;

use commands::console::ProjectEdits;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:2005";
const DEFAULT_SESSION_FILE: &str = ".portfolio-session.json";

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(author, version, about = "Portfolio site CLI tools")]
struct Cli {
    /// Server base URL (overrides `PORTFOLIO_URL`)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create the default admin and sample projects if missing
    Setup {
        /// YAML file with a list of projects to use instead of the samples
        #[arg(long)]
        projects: Option<PathBuf>,
    },
    /// Use the public site
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },
    /// Use the admin console
    Console {
        #[command(subcommand)]
        action: ConsoleAction,
    },
}

#[derive(Subcommand)]
enum SiteAction {
    /// List projects as cards
    Projects,
    /// Send a contact message
    Contact {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum ConsoleAction {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Password (falls back to `PORTFOLIO_ADMIN_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether the stored session is still valid
    Status,
    /// Show stats and recent messages
    Stats,
    /// List messages
    Messages {
        /// `all`, `unread` or `read`
        #[arg(long, default_value = "all")]
        filter: MessageFilter,
    },
    /// Show a message, marking it read
    Show { id: MessageId },
    /// Mark a message read
    Read { id: MessageId },
    /// Delete a message
    DeleteMessage {
        id: MessageId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List projects
    Projects,
    /// Create a project, or update one with `--id`
    SaveProject {
        #[arg(long)]
        id: Option<ProjectId>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated
        #[arg(long)]
        features: Option<String>,
        /// Comma-separated
        #[arg(long)]
        technologies: Option<String>,
        /// Empty string clears the link
        #[arg(long)]
        live_url: Option<String>,
        #[arg(long)]
        github_url: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        featured: Option<bool>,
        /// `completed` or `in-progress`
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        order: Option<i32>,
    },
    /// Delete a project
    DeleteProject {
        id: ProjectId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_cli=info,portfolio_server=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn api_client(server: Option<String>) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let url = server
        .or_else(|| std::env::var("PORTFOLIO_URL").ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
    Ok(ApiClient::new(&url)?)
}

fn session_store() -> FileSessionStore {
    let path = std::env::var("PORTFOLIO_SESSION_FILE")
        .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_owned());
    FileSessionStore::new(path)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Setup { projects } => {
            commands::setup::run(projects.as_deref()).await?;
        }
        Commands::Site { action } => {
            let site = PublicSite::new(api_client(cli.server)?);
            match action {
                SiteAction::Projects => commands::site::projects(&site).await?,
                SiteAction::Contact {
                    name,
                    email,
                    subject,
                    message,
                } => {
                    let form = ContactForm {
                        name,
                        email,
                        subject,
                        message,
                    };
                    commands::site::contact(&site, form).await?;
                }
            }
        }
        Commands::Console { action } => {
            let mut console = AdminConsole::new(api_client(cli.server)?, session_store());
            run_console(&mut console, action).await?;
        }
    }
    Ok(())
}

async fn run_console(
    console: &mut commands::console::Console,
    action: ConsoleAction,
) -> Result<(), Box<dyn std::error::Error>> {
    use commands::console as cmd;

    match action {
        ConsoleAction::Login { username, password } => {
            let password = password
                .or_else(|| std::env::var("PORTFOLIO_ADMIN_PASSWORD").ok())
                .map(SecretString::from)
                .ok_or("password required: pass -p or set PORTFOLIO_ADMIN_PASSWORD")?;
            cmd::login(console, &username, &password).await?;
        }
        ConsoleAction::Logout => cmd::logout(console)?,
        ConsoleAction::Status => cmd::status(console).await?,
        ConsoleAction::Stats => cmd::stats(console).await?,
        ConsoleAction::Messages { filter } => cmd::messages(console, filter).await?,
        ConsoleAction::Show { id } => cmd::show(console, id).await?,
        ConsoleAction::Read { id } => cmd::read(console, id).await?,
        ConsoleAction::DeleteMessage { id, yes } => {
            cmd::delete_message(console, id, yes).await?;
        }
        ConsoleAction::Projects => cmd::projects(console).await?,
        ConsoleAction::SaveProject {
            id,
            title,
            description,
            features,
            technologies,
            live_url,
            github_url,
            image_url,
            featured,
            status,
            order,
        } => {
            let edits = ProjectEdits {
                id,
                title,
                description,
                features,
                technologies,
                live_url,
                github_url,
                image_url,
                featured,
                status,
                order,
            };
            cmd::save_project(console, edits).await?;
        }
        ConsoleAction::DeleteProject { id, yes } => {
            cmd::delete_project(console, id, yes).await?;
        }
    }
    Ok(())
}
