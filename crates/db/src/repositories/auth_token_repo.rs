//! Repository for the `auth_tokens` table.

use sqlx::PgPool;
use tessera_core::types::{DbId, Timestamp};

use crate::models::auth_token::{AuthToken, CreateAuthToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, session_id, access_token, refresh_token, \
                        expires_at, is_active, created_at, updated_at";

/// Provides CRUD operations for issued token pairs.
pub struct AuthTokenRepo;

impl AuthTokenRepo {
    /// Record a newly issued token pair, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAuthToken) -> Result<AuthToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO auth_tokens (user_id, session_id, access_token, refresh_token, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthToken>(&query)
            .bind(input.user_id)
            .bind(input.session_id)
            .bind(&input.access_token)
            .bind(&input.refresh_token)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Look up the active pair holding the given refresh token.
    ///
    /// Rotation requires the presented refresh token to still be the live
    /// one for its session; a revoked or already-rotated token finds
    /// nothing here.
    pub async fn find_active_by_refresh_token(
        pool: &PgPool,
        refresh_token: &str,
    ) -> Result<Option<AuthToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM auth_tokens
             WHERE refresh_token = $1 AND is_active = true"
        );
        sqlx::query_as::<_, AuthToken>(&query)
            .bind(refresh_token)
            .fetch_optional(pool)
            .await
    }

    /// Flag all active pairs for a session as superseded.
    ///
    /// Called before inserting the replacement pair on refresh, and when a
    /// single device is signed out. Returns the count deactivated.
    pub async fn deactivate_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET is_active = false
             WHERE session_id = $1 AND is_active = true",
        )
        .bind(session_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flag every active pair belonging to a user as revoked.
    ///
    /// Returns the count deactivated.
    pub async fn deactivate_all_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET is_active = false
             WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete pairs issued before `cutoff`, whatever their state.
    ///
    /// The cutoff should sit beyond the refresh-token lifetime so no live
    /// pair is removed. Returns the count deleted.
    pub async fn delete_issued_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
