//! Issued token-pair model and DTOs.

use sqlx::FromRow;
use tessera_core::types::{DbId, Timestamp};

/// A row from the `auth_tokens` table.
///
/// Records every access/refresh pair issued for a session. Superseded pairs
/// are flagged inactive rather than deleted so sign-in history survives a
/// refresh. Stores the signed tokens verbatim; treat rows like credentials.
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub id: DbId,
    pub user_id: DbId,
    pub session_id: DbId,
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token in the pair.
    pub expires_at: Timestamp,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a newly issued token pair.
#[derive(Debug, Clone)]
pub struct CreateAuthToken {
    pub user_id: DbId,
    pub session_id: DbId,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Timestamp,
}
