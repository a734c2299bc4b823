//! Portfolio API server library.
//!
//! This crate provides the JSON API and static site server as a library,
//! allowing it to be tested and embedded by the CLI and integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use app::router;
pub use config::ServerConfig;
pub use state::AppState;
