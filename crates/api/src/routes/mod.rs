pub mod admin;
pub mod auth;
pub mod health;
pub mod payment;
pub mod templates;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                             signup (public)
/// /auth/signin                             signin (public)
/// /auth/verify-email                       consume verification token (public)
/// /auth/resend-verification                resend verification email (public)
/// /auth/forgot                             request password reset (public)
/// /auth/reset-password                     consume reset token (public)
/// /auth/refresh-token                      rotate token pair (refresh cookie or body)
/// /auth/details                            current user profile
/// /auth/logout                             logout + clear cookies
/// /auth/sessions                           list (GET), revoke all (DELETE)
/// /auth/sessions/stats                     aggregated session stats
/// /auth/sessions/{id}                      revoke one session (DELETE)
///
/// /templates                               list (GET, public), create (POST, admin)
/// /templates/access-info                   caller's download/screenshot access
/// /templates/my/templates                  caller's own uploads
/// /templates/premium/available             premium catalog (premium or admin)
/// /templates/{id}                          get (public), update, delete (owner/admin)
/// /templates/{id}/download                 gated file download (premium or admin)
/// /templates/{id}/check-screenshot         screenshot gate verdict (POST)
///
/// /payment/create-checkout-session         start premium checkout (POST)
/// /payment/webhook                         processor events (POST, public)
///
/// /admin/dashboard/stats                   marketplace totals
/// /admin/dashboard/monthly-analytics       trailing monthly buckets
/// /admin/dashboard/top-templates           most-downloaded templates
/// /admin/users                             user listing
/// /admin/users/stats                       user totals
/// /admin/users/{id}/toggle-status          activate/deactivate (POST)
/// /admin/users/{id}/resend-verification    resend verification (POST)
/// /admin/analytics/template/{id}           per-template analytics
/// /admin/analytics/daily                   per-day download/view counts
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Accounts, tokens, and device sessions.
        .nest("/auth", auth::router())
        // Template catalog, uploads, and the premium-gated surfaces.
        .nest("/templates", templates::router(config.uploads.max_file_size))
        // Premium checkout and processor webhook.
        .nest("/payment", payment::router())
        // Admin dashboards, user management, analytics.
        .nest("/admin", admin::router())
}
