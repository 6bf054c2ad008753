//! Repository for the `sessions` table.

use sqlx::PgPool;
use tessera_core::types::{DbId, Timestamp};

use crate::models::session::{CreateSession, Session, SessionStats};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, user_agent, browser, os, device, ip_address, \
                        is_active, last_activity, created_at, updated_at";

/// Provides CRUD operations for login sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, user_agent, browser, os, device, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.device.user_agent)
            .bind(&input.device.browser)
            .bind(&input.device.os)
            .bind(&input.device.device)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Find a session by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every session for a user, active or not, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a single session owned by the given user.
    ///
    /// Returns `true` if an active session matched both IDs.
    pub async fn deactivate(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = false
             WHERE id = $1 AND user_id = $2 AND is_active = true",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deactivate all active sessions for a user. Returns the count deactivated.
    pub async fn deactivate_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = false
             WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Bump `last_activity` to now, marking the session as recently used.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET last_activity = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Aggregate session counts for one user, including per-device and
    /// per-browser breakdowns over all sessions ever created.
    pub async fn stats_for_user(pool: &PgPool, user_id: DbId) -> Result<SessionStats, sqlx::Error> {
        let (total_sessions, active_sessions): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active)
             FROM sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let by_device: Vec<(String, i64)> = sqlx::query_as(
            "SELECT device, COUNT(*) FROM sessions WHERE user_id = $1 GROUP BY device",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let by_browser: Vec<(String, i64)> = sqlx::query_as(
            "SELECT browser, COUNT(*) FROM sessions WHERE user_id = $1 GROUP BY browser",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(SessionStats {
            total_sessions,
            active_sessions,
            inactive_sessions: total_sessions - active_sessions,
            sessions_by_device: by_device.into_iter().collect(),
            sessions_by_browser: by_browser.into_iter().collect(),
        })
    }

    /// Deactivate active sessions idle since before `cutoff`.
    ///
    /// Returns the count deactivated.
    pub async fn deactivate_idle_since(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = false
             WHERE is_active = true AND last_activity < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
