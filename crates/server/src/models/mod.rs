//! Server-side domain types that never cross the wire.
//!
//! Records shared with clients live in `portfolio-core`.

pub mod admin;

pub use admin::{AdminCredentials, NewAdmin};
