//! Admin API: login, setup and the bearer-protected console endpoints.

pub mod auth;
pub mod messages;
pub mod projects;
pub mod stats;

use std::str::FromStr;

use crate::error::AppError;

/// Parse a path identifier. Anything that is not a valid id cannot match a
/// record, so it is reported as not found.
fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| AppError::not_found(what))
}
