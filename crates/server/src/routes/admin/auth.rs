//! Admin login, first-admin setup and session check.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use portfolio_core::{AdminIdentity, ApiMessage, LoginRequest, LoginResponse, SetupRequest};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::CurrentAdmin;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Exchange username and password for a bearer token.
///
/// POST /api/admin/login
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.store(), state.tokens());
    Ok(Json(auth.login(request).await?))
}

/// Create the first admin. Refused once any admin exists.
///
/// POST /api/admin/setup
#[instrument(skip(state, request))]
pub async fn setup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetupRequest>,
) -> Result<(StatusCode, Json<ApiMessage>)> {
    let auth = AuthService::new(state.store(), state.tokens());
    auth.setup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::new("Admin created successfully")),
    ))
}

/// The identity carried by the presented token.
///
/// GET /api/admin/session
pub async fn session(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminIdentity> {
    Json(admin)
}
