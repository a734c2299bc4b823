//! Message inbox triage.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use portfolio_core::{ApiMessage, Message, MessageId};

use super::parse_id;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// GET /api/admin/messages
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Message>>> {
    Ok(Json(state.store().list_messages().await?))
}

/// Flag a message as read. Marking an already-read message is a no-op.
///
/// PATCH /api/admin/messages/{id}/read
#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>> {
    let id: MessageId = parse_id(&id, "Message")?;
    state
        .store()
        .mark_message_read(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Message"))
}

/// DELETE /api/admin/messages/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>> {
    let id: MessageId = parse_id(&id, "Message")?;
    if !state.store().delete_message(id).await? {
        return Err(AppError::not_found("Message"));
    }

    tracing::info!(message_id = %id, "Message deleted");
    Ok(Json(ApiMessage::new("Message deleted")))
}
