//! Portfolio Client - public site and admin console logic.
//!
//! Everything here talks to the server through [`ApiClient`]; rendering is
//! left to the caller (the CLI prints, a UI would draw).
//!
//! # Modules
//!
//! - [`api`] - Typed wrapper over the JSON API
//! - [`public`] - Project cards and the contact form
//! - [`admin`] - Session handling, inbox triage and project editing
//! - [`session`] - Durable session storage

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod api;
pub mod error;
pub mod public;
pub mod session;

pub use admin::{AdminConsole, Dashboard, MessageFilter, ProjectForm};
pub use api::ApiClient;
pub use error::ClientError;
pub use public::{Banner, ContactForm, ProjectCard, PublicSite};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
