//! Authentication extractor for Axum handlers.
//!
//! Resolves the requester from the `access_token` cookie or, as a fallback,
//! an `Authorization: Bearer` header (the cookie wins when both are present).
//! The user row is re-read from the database on every request, so role and
//! premium changes take effect immediately instead of waiting for the token
//! to be reissued.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tessera_core::error::CoreError;
use tessera_db::models::user::User;
use tessera_db::repositories::UserRepo;

use crate::auth::jwt::validate_access_token;
use crate::cookies::{self, ACCESS_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated requester with a freshly loaded user row.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(current: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = current.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user row as of this request.
    pub user: User,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(parts)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Not authenticated".into())))?;

        let claims = validate_access_token(&token, &state.config.jwt).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid access token".into()))
        })?;

        let user = UserRepo::find_by_id(&state.pool, claims.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "User not found or inactive".into(),
                ))
            })?;

        Ok(CurrentUser { user })
    }
}

/// Requester identity on endpoints that are public but personalize when a
/// valid token is supplied. Never rejects; anonymous and broken credentials
/// both resolve to `None`.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state)
            .await
            .ok()
            .map(|current| current.user);
        Ok(MaybeUser(user))
    }
}

/// Pull the access token from the cookie or the `Authorization` header.
fn extract_access_token(parts: &Parts) -> Option<String> {
    if let Some(token) = cookies::extract_cookie(&parts.headers, ACCESS_COOKIE) {
        return Some(token);
    }

    let auth_header = parts.headers.get("authorization")?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
