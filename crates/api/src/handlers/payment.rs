//! Handlers for the /payment resource.
//!
//! Premium upgrades run through a hosted checkout page: the client asks for a
//! checkout session, redirects the buyer to the processor, and the processor
//! posts a webhook back once the payment clears.

use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::payment::{CheckoutSession, PaymentError, WebhookEvent, CHECKOUT_COMPLETED_EVENT};
use crate::response::MessageResponse;
use crate::state::AppState;
use tessera_db::repositories::user_repo::UserRepo;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/payment/create-checkout-session
///
/// Create a checkout session for the premium upgrade and return its id so the
/// frontend can redirect the buyer to the hosted payment page.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<CheckoutSession>> {
    let client = state
        .payment
        .as_ref()
        .ok_or_else(|| AppError::InternalError("Payment processing is not configured".into()))?;

    let session = client
        .create_checkout_session(current.user.id, &state.config.frontend_url)
        .await
        .map_err(|err| match err {
            PaymentError::ApiError { status, body } => {
                tracing::warn!(status, "Payment processor rejected checkout session");
                AppError::BadRequest(format!("Payment error: {body}"))
            }
            PaymentError::Request(err) => AppError::BadRequest(format!("Payment error: {err}")),
        })?;

    Ok(Json(session))
}

/// POST /api/v1/payment/webhook
///
/// Receive payment events from the processor. A completed checkout grants the
/// buyer premium access; every other event type is acknowledged and ignored
/// so the processor does not retry it.
pub async fn webhook(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> AppResult<Json<MessageResponse>> {
    if event.event_type != CHECKOUT_COMPLETED_EVENT {
        tracing::debug!(event_type = %event.event_type, "Ignoring payment event");
        return Ok(Json(MessageResponse::new("Event ignored")));
    }

    let object = &event.data.object;
    let Some(user_id) = object.user_id() else {
        tracing::warn!(session_id = %object.id, "Completed checkout carries no user id");
        return Ok(Json(MessageResponse::new("Event ignored")));
    };

    let granted = UserRepo::grant_premium(&state.pool, user_id, object.customer.as_deref()).await?;
    if !granted {
        tracing::warn!(user_id, "Completed checkout for unknown user");
        return Ok(Json(MessageResponse::new("Event ignored")));
    }

    tracing::info!(user_id, session_id = %object.id, "Premium access granted");
    Ok(Json(MessageResponse::new("Premium access granted")))
}
