//! Route definitions for the `/admin` resource.
//!
//! Every endpoint here requires an admin caller; the handlers enforce it via
//! the `RequireAdmin` extractor.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /dashboard/stats                  -> dashboard_stats
/// GET  /dashboard/monthly-analytics      -> monthly_analytics (?months=1..12)
/// GET  /dashboard/top-templates          -> top_templates (?limit=1..50)
/// GET  /users                            -> list_users (?skip&limit)
/// GET  /users/stats                      -> user_stats
/// POST /users/{id}/toggle-status         -> toggle_user_status
/// POST /users/{id}/resend-verification   -> resend_verification
/// GET  /analytics/template/{id}          -> template_analytics
/// GET  /analytics/daily                  -> daily_analytics (?days=1..365)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(admin::dashboard_stats))
        .route(
            "/dashboard/monthly-analytics",
            get(admin::monthly_analytics),
        )
        .route("/dashboard/top-templates", get(admin::top_templates))
        .route("/users", get(admin::list_users))
        .route("/users/stats", get(admin::user_stats))
        .route("/users/{user_id}/toggle-status", post(admin::toggle_user_status))
        .route(
            "/users/{user_id}/resend-verification",
            post(admin::resend_verification),
        )
        .route(
            "/analytics/template/{template_id}",
            get(admin::template_analytics),
        )
        .route("/analytics/daily", get(admin::daily_analytics))
}
