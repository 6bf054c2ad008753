//! Domain error taxonomy shared by the db and api crates.
//!
//! [`CoreError`] carries no HTTP knowledge; the api crate maps each
//! variant to a status code and JSON body in its own error type.

/// Domain-level error for operations that can fail without HTTP context.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist. Carries the entity name,
    /// e.g. `NotFound("User")` renders as "User not found".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input failed a domain validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state (e.g. duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing, expired, or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation is gated behind a premium entitlement the
    /// requester does not hold. Distinct from [`CoreError::Forbidden`]
    /// so the HTTP layer can attach the upgrade action hint.
    #[error("Premium access required")]
    PremiumRequired,

    /// Unexpected failure with no better classification.
    #[error("Internal error: {0}")]
    Internal(String),
}
