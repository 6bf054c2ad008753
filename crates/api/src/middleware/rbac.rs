//! Role- and entitlement-based access control extractors.
//!
//! Each extractor wraps [`CurrentUser`] and rejects requests that do not meet
//! the requirement. Use these in route handlers to enforce authorization at
//! the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tessera_core::access::has_premium_access;
use tessera_core::error::CoreError;
use tessera_core::roles::ROLE_ADMIN;

use super::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(current): RequireAdmin) -> AppResult<Json<()>> {
///     // current.user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if current.user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin access required".into(),
            )));
        }
        Ok(RequireAdmin(current))
    }
}

/// Requires the premium entitlement (or the `admin` role, which bypasses it).
/// Rejects with 402 Payment Required carrying the upgrade hint otherwise.
///
/// The verdict is computed from the freshly loaded user row, so an upgrade
/// completed a moment ago unlocks the very next request.
pub struct RequirePremium(pub CurrentUser);

impl FromRequestParts<AppState> for RequirePremium {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !has_premium_access(&current.user.role, current.user.is_premium) {
            return Err(AppError::Core(CoreError::PremiumRequired));
        }
        Ok(RequirePremium(current))
    }
}
