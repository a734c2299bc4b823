//! Public project listing.

use axum::{Json, extract::State};
use tracing::instrument;

use portfolio_core::Project;

use crate::error::Result;
use crate::state::AppState;

/// List every project.
///
/// GET /api/projects
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.store().list_projects().await?))
}
