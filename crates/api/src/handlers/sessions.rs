//! Handlers for the `/auth/sessions` resource (device/session management).

use axum::extract::{Path, State};
use axum::Json;
use tessera_core::error::CoreError;
use tessera_core::types::DbId;
use tessera_db::models::session::{SessionResponse, SessionStats};
use tessera_db::repositories::{AuthTokenRepo, SessionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::response::MessageResponse;
use crate::state::AppState;

/// GET /api/v1/auth/sessions
///
/// Every session for the authenticated user, active and inactive, newest
/// first.
pub async fn list_sessions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<SessionResponse>>> {
    let sessions = SessionRepo::list_for_user(&state.pool, current.user.id).await?;
    Ok(Json(sessions.iter().map(SessionResponse::from).collect()))
}

/// DELETE /api/v1/auth/sessions
///
/// Deactivate every session and token pair for the user (logout everywhere).
pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    SessionRepo::deactivate_all_for_user(&state.pool, current.user.id).await?;
    AuthTokenRepo::deactivate_all_for_user(&state.pool, current.user.id).await?;

    Ok(Json(MessageResponse::new("Logged out from all devices")))
}

/// DELETE /api/v1/auth/sessions/{id}
///
/// Deactivate a single session owned by the user, along with its token
/// pairs so the device's refresh token stops working.
pub async fn revoke_session(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let revoked = SessionRepo::deactivate(&state.pool, session_id, current.user.id).await?;
    if !revoked {
        return Err(AppError::Core(CoreError::NotFound("Session")));
    }

    AuthTokenRepo::deactivate_for_session(&state.pool, session_id).await?;

    Ok(Json(MessageResponse::new("Device logged out successfully")))
}

/// GET /api/v1/auth/sessions/stats
///
/// Aggregated session counts for the user, broken down by device and
/// browser.
pub async fn session_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<SessionStats>> {
    let stats = SessionRepo::stats_for_user(&state.pool, current.user.id).await?;
    Ok(Json(stats))
}
