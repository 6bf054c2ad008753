//! Route definitions for the `/auth` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{auth, sessions};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /signup                -> signup (public)
/// POST   /signin                -> signin (public)
/// POST   /verify-email          -> verify_email (public)
/// POST   /resend-verification   -> resend_verification (public)
/// POST   /forgot                -> forgot_password (public)
/// POST   /reset-password        -> reset_password (public)
/// POST   /refresh-token         -> refresh_token (refresh cookie or body)
/// GET    /details               -> details (requires auth)
/// POST   /logout                -> logout (requires auth)
/// GET    /sessions              -> list_sessions (requires auth)
/// DELETE /sessions              -> revoke_all_sessions (requires auth)
/// GET    /sessions/stats        -> session_stats (requires auth)
/// DELETE /sessions/{id}         -> revoke_session (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/forgot", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/details", get(auth::details))
        .route("/logout", post(auth::logout))
        .route(
            "/sessions",
            get(sessions::list_sessions).delete(sessions::revoke_all_sessions),
        )
        .route("/sessions/stats", get(sessions::session_stats))
        .route("/sessions/{session_id}", delete(sessions::revoke_session))
}
