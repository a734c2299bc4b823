//! Business logic services.
//!
//! - `auth` - Admin login, first-admin setup, bearer tokens
//! - `bootstrap` - Default admin and sample projects

pub mod auth;
pub mod bootstrap;
