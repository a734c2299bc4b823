//! Public contact form endpoint.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use portfolio_core::{ApiMessage, ContactSubmission};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Store a contact form submission as an unread message.
///
/// POST /api/messages
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactSubmission>,
) -> Result<(StatusCode, Json<ApiMessage>)> {
    let message = form.validate()?;
    let stored = state.store().create_message(message).await?;

    tracing::info!(message_id = %stored.id, "Contact message received");
    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::new("Message sent successfully")),
    ))
}
