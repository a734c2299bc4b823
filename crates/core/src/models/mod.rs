//! Records and request/response bodies shared by the server and its clients.
//!
//! Field names follow the JSON API (`camelCase`, `_id` for record identifiers).

pub mod admin;
pub mod message;
pub mod project;

pub use admin::{
    AdminIdentity, AdminProfile, DashboardStats, LoginRequest, LoginResponse, SetupRequest,
};
pub use message::{ContactSubmission, Message, NewMessage};
pub use project::{NewProject, Project, ProjectInput};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A request body or field failed validation.
///
/// The message is shown to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Create a validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The `{"message": "..."}` body used for acknowledgements and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// True if the field is absent or contains only whitespace.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Combine with `#[serde(default)]`: absent yields `None`, `null` yields
/// `Some(None)`, and a value yields `Some(Some(v))`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
