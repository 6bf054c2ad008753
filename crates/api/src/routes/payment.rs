//! Route definitions for the `/payment` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Routes mounted at `/payment`.
///
/// ```text
/// POST /create-checkout-session  -> create_checkout_session (requires auth)
/// POST /webhook                  -> webhook (processor callback, public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/create-checkout-session",
            post(payment::create_checkout_session),
        )
        .route("/webhook", post(payment::webhook))
}
