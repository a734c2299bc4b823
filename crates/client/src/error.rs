//! Client error types.

use thiserror::Error;

/// Errors returned by the API client and the UI logic built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced a response (connection, TLS, body decoding).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// A stored token was rejected; the session has been cleared.
    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("{0}")]
    Validation(String),

    #[error("{what} not found")]
    NotFound { what: &'static str },

    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    SessionFormat(#[from] serde_json::Error),
}

impl ClientError {
    /// True for 401/403 answers, which mean the bearer token is unusable.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// The HTTP status, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
