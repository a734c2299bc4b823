//! Portfolio Core - Shared types library.
//!
//! This crate provides the types shared by every portfolio component:
//! - `server` - JSON API and static site
//! - `client` - Public site and admin console client logic
//! - `cli` - Migrations, bootstrap and console commands
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses
//! - [`models`] - Records and request/response bodies as they appear on the wire

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
