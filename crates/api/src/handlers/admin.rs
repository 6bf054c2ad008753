//! Handlers for the `/admin` resource: dashboards, user management, and
//! engagement analytics. Every endpoint requires the admin role.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tessera_core::error::CoreError;
use tessera_core::roles;
use tessera_core::types::DbId;
use tessera_db::models::analytics::{
    DailyAnalytics, DashboardStats, MonthlyAnalytics, TemplateAnalytics, TemplateStats,
};
use tessera_db::models::user::{AdminUserItem, UserStats};
use tessera_db::repositories::{AnalyticsRepo, TemplateRepo, UserRepo};

use crate::auth::jwt::{generate_verification_token, VERIFICATION_EXPIRY_HOURS};
use crate::email::spawn_verification_email;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Default and maximum window for the monthly analytics chart.
const DEFAULT_MONTHS: i64 = 6;
const MAX_MONTHS: i64 = 12;

/// Default and maximum size of the top-templates report.
const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 50;

/// Default and maximum page size for the user management listing.
const DEFAULT_USER_LIMIT: i64 = 100;
const MAX_USER_LIMIT: i64 = 1000;

/// Default and maximum window for the daily analytics report.
const DEFAULT_DAYS: i64 = 30;
const MAX_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /admin/dashboard/monthly-analytics`.
#[derive(Debug, Deserialize)]
pub struct MonthsParams {
    pub months: Option<i64>,
}

/// Query parameters for `GET /admin/dashboard/top-templates`.
#[derive(Debug, Deserialize)]
pub struct TopTemplatesParams {
    pub limit: Option<i64>,
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for `GET /admin/analytics/daily`.
#[derive(Debug, Deserialize)]
pub struct DaysParams {
    pub days: Option<i64>,
}

// ---------------------------------------------------------------------------
// Dashboard handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard/stats
///
/// Headline totals plus this-month counters for the admin overview.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<DashboardStats>> {
    let stats = AnalyticsRepo::dashboard_stats(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /api/v1/admin/dashboard/monthly-analytics
///
/// Per-month template/download/user counts, oldest month first.
pub async fn monthly_analytics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<MonthsParams>,
) -> AppResult<Json<Vec<MonthlyAnalytics>>> {
    let months = params.months.unwrap_or(DEFAULT_MONTHS).clamp(1, MAX_MONTHS) as u32;
    let rows = AnalyticsRepo::monthly_analytics(&state.pool, months).await?;
    Ok(Json(rows))
}

/// GET /api/v1/admin/dashboard/top-templates
///
/// Templates ranked by download count, views included.
pub async fn top_templates(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<TopTemplatesParams>,
) -> AppResult<Json<Vec<TemplateStats>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT);
    let rows = AnalyticsRepo::top_templates(&state.pool, limit).await?;
    Ok(Json(rows))
}

// ---------------------------------------------------------------------------
// User management handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
///
/// User rows shaped for the management table. Returns a bare array.
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Vec<AdminUserItem>>> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_USER_LIMIT)
        .clamp(1, MAX_USER_LIMIT);

    let users = UserRepo::list(&state.pool, skip, limit).await?;
    Ok(Json(users.iter().map(AdminUserItem::from).collect()))
}

/// GET /api/v1/admin/users/stats
pub async fn user_stats(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<UserStats>> {
    let stats = UserRepo::stats(&state.pool).await?;
    Ok(Json(stats))
}

/// POST /api/v1/admin/users/{id}/toggle-status
///
/// Flip a user's active flag. Admins cannot modify other admin accounts,
/// though they may deactivate their own.
pub async fn toggle_user_status(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let target = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))?;

    if roles::is_admin(&target.role) && target.id != current.user.id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot modify other admin users".into(),
        )));
    }

    let new_status = !target.is_active;
    UserRepo::set_active(&state.pool, target.id, new_status).await?;

    let action = if new_status { "activated" } else { "deactivated" };
    Ok(Json(MessageResponse::new(format!(
        "User {action} successfully"
    ))))
}

/// POST /api/v1/admin/users/{id}/resend-verification
///
/// Issue and email a fresh verification token for an unverified account.
pub async fn resend_verification(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))?;

    if user.is_verified {
        return Err(AppError::BadRequest("User is already verified".into()));
    }

    let token = generate_verification_token(&user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let expires_at = Utc::now() + Duration::hours(VERIFICATION_EXPIRY_HOURS);
    UserRepo::set_verification_token(&state.pool, user.id, &token, expires_at).await?;

    spawn_verification_email(&state.mailer, &user.email, &token);

    Ok(Json(MessageResponse::new(
        "Verification email sent successfully",
    )))
}

// ---------------------------------------------------------------------------
// Analytics handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/analytics/template/{id}
///
/// Engagement report for one template. 404 when the template does not
/// exist; a template with no logged activity reports zeroes.
pub async fn template_analytics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<TemplateAnalytics>> {
    if TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound("Template")));
    }

    let analytics = AnalyticsRepo::template_analytics(&state.pool, template_id).await?;
    Ok(Json(analytics))
}

/// GET /api/v1/admin/analytics/daily
///
/// Per-day download and view counts over the requested window.
pub async fn daily_analytics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<DaysParams>,
) -> AppResult<Json<Vec<DailyAnalytics>>> {
    let days = params.days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);
    let rows = AnalyticsRepo::daily_analytics(&state.pool, days).await?;
    Ok(Json(rows))
}
