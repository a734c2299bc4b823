//! Project catalog management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use portfolio_core::{ApiMessage, Project, ProjectId, ProjectInput};

use super::parse_id;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /api/admin/projects
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state
        .store()
        .create_project(input.into_new_project()?)
        .await?;

    tracing::info!(project_id = %project.id, title = %project.title, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// Merge the supplied fields into an existing project.
///
/// PUT /api/admin/projects/{id}
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> Result<Json<Project>> {
    let id: ProjectId = parse_id(&id, "Project")?;
    let existing = state
        .store()
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::not_found("Project"))?;

    let fields = input.merge_into(&existing)?;
    let updated = state
        .store()
        .update_project(id, fields)
        .await?
        .ok_or_else(|| AppError::not_found("Project"))?;

    tracing::info!(project_id = %id, "Project updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/projects/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>> {
    let id: ProjectId = parse_id(&id, "Project")?;
    if !state.store().delete_project(id).await? {
        return Err(AppError::not_found("Project"));
    }

    tracing::info!(project_id = %id, "Project deleted");
    Ok(Json(ApiMessage::new("Project deleted")))
}
