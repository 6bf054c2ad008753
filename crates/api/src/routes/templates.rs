//! Route definitions for the `/templates` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Headroom on top of the configured upload cap for multipart framing and the
/// non-file form fields. The handler enforces the real per-file limit.
const UPLOAD_BODY_SLACK: usize = 64 * 1024;

/// Routes mounted at `/templates`.
///
/// Static segments are matched before `{template_id}` captures, so the
/// `/access-info`, `/my/templates`, and `/premium/available` paths stay
/// reachable.
///
/// ```text
/// GET    /                        -> list_templates (public)
/// POST   /                        -> create_template (admin, multipart)
/// GET    /access-info             -> access_info (requires auth)
/// GET    /my/templates            -> my_templates (requires auth)
/// GET    /premium/available       -> premium_templates (premium or admin)
/// GET    /{template_id}           -> get_template (public, logs the view)
/// PUT    /{template_id}           -> update_template (owner or admin)
/// DELETE /{template_id}           -> delete_template (owner or admin)
/// GET    /{template_id}/download  -> download_template (premium or admin)
/// POST   /{template_id}/check-screenshot -> check_screenshot (premium or admin)
/// ```
pub fn router(max_upload: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route("/access-info", get(templates::access_info))
        .route("/my/templates", get(templates::my_templates))
        .route("/premium/available", get(templates::premium_templates))
        .route(
            "/{template_id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/{template_id}/download", get(templates::download_template))
        .route(
            "/{template_id}/check-screenshot",
            post(templates::check_screenshot),
        )
        .layer(DefaultBodyLimit::max(max_upload + UPLOAD_BODY_SLACK))
}
