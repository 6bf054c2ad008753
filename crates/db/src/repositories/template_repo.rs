//! Repository for the `templates` table.

use sqlx::PgPool;
use tessera_core::types::DbId;

use crate::models::template::{CreateTemplate, Template, TemplateResponse, UpdateTemplate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, image_url, file_size, width, height, \
                        uploaded_by, created_at, updated_at";

/// Columns for the listing view, with the uploader name resolved via JOIN.
const LISTING_COLUMNS: &str = "t.id, t.title, t.description, t.image_url, \
     COALESCE(u.first_name || ' ' || u.last_name, 'Unknown') AS uploaded_by, \
     t.created_at, t.updated_at";

/// Provides CRUD operations for marketplace templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (title, description, image_url, file_size, width, height, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(input.file_size)
            .bind(input.width)
            .bind(input.height)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template by ID in listing shape, uploader name resolved.
    pub async fn find_listing_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS}
             FROM templates t
             LEFT JOIN users u ON u.id = t.uploaded_by
             WHERE t.id = $1"
        );
        sqlx::query_as::<_, TemplateResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count all templates.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(pool)
            .await
    }

    /// Count templates uploaded by one user.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM templates WHERE uploaded_by = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// One page of the public listing, newest first, with uploader names
    /// resolved. Uploaders whose account no longer exists show as `"Unknown"`.
    pub async fn list_page(
        pool: &PgPool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<TemplateResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS}
             FROM templates t
             LEFT JOIN users u ON u.id = t.uploaded_by
             ORDER BY t.created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, TemplateResponse>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// One page of templates uploaded by one user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates WHERE uploaded_by = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a template. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET
                title = COALESCE($2, title),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a template. Download and view logs cascade with it.
    ///
    /// Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
