//! Dashboard counters.

use axum::{Json, extract::State};
use tracing::instrument;

use portfolio_core::DashboardStats;

use crate::error::Result;
use crate::state::AppState;

/// Computed fresh on every call.
///
/// GET /api/admin/stats
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let store = state.store();
    let counts = store.message_counts().await?;
    let total_projects = store.count_projects().await?;

    Ok(Json(DashboardStats {
        total_messages: counts.total,
        unread_messages: counts.unread,
        total_projects,
    }))
}
