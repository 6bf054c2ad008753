//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use tessera_core::types::{DbId, Timestamp};
use ts_rs::TS;

/// Full user row from the `users` table.
///
/// Contains the password hash and the email-flow token columns -- NEVER
/// serialize this to API responses directly. Use [`UserResponse`] for
/// external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Role name, either `"user"` or `"admin"`.
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_premium: bool,
    pub premium_activated_at: Option<Timestamp>,
    pub payment_customer_id: Option<String>,
    pub verification_token: Option<String>,
    pub verification_token_expires_at: Option<Timestamp>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Display name shown next to content the user published.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Safe user representation for API responses (no hash, no token columns).
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_premium: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            is_premium: user.is_premium,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// User view for the admin listing. Extends [`UserResponse`] with the
/// last-login timestamp.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct AdminUserItem {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_premium: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for AdminUserItem {
    fn from(user: &User) -> Self {
        AdminUserItem {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            is_premium: user.is_premium,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Aggregate user counts for the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct UserStats {
    pub total_users: i64,
    pub verified_users: i64,
    pub premium_users: i64,
    pub active_users: i64,
    pub admin_users: i64,
}
