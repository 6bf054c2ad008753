//! Shared response types for API handlers.
//!
//! Confirmation-only endpoints return a [`MessageResponse`] instead of ad-hoc
//! `serde_json::json!({ "message": ... })` so the shape stays consistent and
//! typed across handlers.

use serde::Serialize;

/// Standard `{ "message": ... }` confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Build a confirmation from anything stringly.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
