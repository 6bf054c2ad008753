//! Repository for the `download_logs` and `view_logs` tables, and the
//! aggregate reports built over them.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Months, TimeZone, Utc};
use sqlx::PgPool;
use tessera_core::types::{DbId, Timestamp};

use crate::models::analytics::{
    CreateDownloadLog, CreateViewLog, DailyAnalytics, DashboardStats, MonthlyAnalytics,
    TemplateAnalytics, TemplateStats,
};

/// Window used for the "recent activity" counters in per-template reports.
const RECENT_WINDOW_DAYS: i64 = 30;

/// Provides insert and report queries for engagement logs.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Record a template download, returning the generated log ID.
    pub async fn log_download(
        pool: &PgPool,
        input: &CreateDownloadLog,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO download_logs (template_id, user_id, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(input.template_id)
        .bind(input.user_id)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .fetch_one(pool)
        .await
    }

    /// Record a template view, returning the generated log ID.
    pub async fn log_view(pool: &PgPool, input: &CreateViewLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO view_logs (template_id, user_id, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(input.template_id)
        .bind(input.user_id)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .fetch_one(pool)
        .await
    }

    /// Headline counters for the admin dashboard in a single round trip.
    ///
    /// "This month" means since midnight UTC on the first of the current month.
    pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        let month_start = start_of_month(Utc::now());
        sqlx::query_as::<_, DashboardStats>(
            "SELECT
                (SELECT COUNT(*) FROM templates) AS total_templates,
                (SELECT COUNT(*) FROM download_logs) AS total_downloads,
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE is_premium) AS premium_users,
                (SELECT COUNT(*) FROM users WHERE is_verified) AS verified_users,
                (SELECT COUNT(*) FROM templates WHERE created_at >= $1) AS templates_this_month,
                (SELECT COUNT(*) FROM download_logs WHERE created_at >= $1) AS downloads_this_month,
                (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS users_this_month",
        )
        .bind(month_start)
        .fetch_one(pool)
        .await
    }

    /// Per-month counts of new templates, downloads, and users for the last
    /// `months` calendar months, oldest first. Months without activity are
    /// included with zero counts.
    pub async fn monthly_analytics(
        pool: &PgPool,
        months: u32,
    ) -> Result<Vec<MonthlyAnalytics>, sqlx::Error> {
        let current = start_of_month(Utc::now());
        let window_start = current
            .checked_sub_months(Months::new(months.saturating_sub(1)))
            .unwrap_or(current);

        let templates = monthly_counts(pool, "templates", window_start).await?;
        let downloads = monthly_counts(pool, "download_logs", window_start).await?;
        let users = monthly_counts(pool, "users", window_start).await?;

        let mut report = Vec::with_capacity(months as usize);
        for i in 0..months {
            let month = window_start
                .checked_add_months(Months::new(i))
                .unwrap_or(window_start);
            let label = month.format("%b %Y").to_string();
            report.push(MonthlyAnalytics {
                templates: templates.get(&label).copied().unwrap_or(0),
                downloads: downloads.get(&label).copied().unwrap_or(0),
                users: users.get(&label).copied().unwrap_or(0),
                month: label,
            });
        }
        Ok(report)
    }

    /// Templates ranked by total downloads, with view counts and uploader
    /// names resolved alongside.
    pub async fn top_templates(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<TemplateStats>, sqlx::Error> {
        sqlx::query_as::<_, TemplateStats>(
            "SELECT t.id AS template_id,
                    t.title AS template_title,
                    COALESCE(d.cnt, 0) AS download_count,
                    COALESCE(v.cnt, 0) AS view_count,
                    COALESCE(u.first_name || ' ' || u.last_name, 'Unknown') AS uploaded_by,
                    t.created_at
             FROM templates t
             LEFT JOIN users u ON u.id = t.uploaded_by
             LEFT JOIN (SELECT template_id, COUNT(*) AS cnt
                        FROM download_logs GROUP BY template_id) d ON d.template_id = t.id
             LEFT JOIN (SELECT template_id, COUNT(*) AS cnt
                        FROM view_logs GROUP BY template_id) v ON v.template_id = t.id
             ORDER BY download_count DESC, t.created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Per-day download and view counts over the last `days` days, oldest
    /// first. Days with no activity are omitted.
    pub async fn daily_analytics(
        pool: &PgPool,
        days: i64,
    ) -> Result<Vec<DailyAnalytics>, sqlx::Error> {
        let window_start = Utc::now() - chrono::Duration::days(days);

        let downloads: Vec<(String, i64)> = sqlx::query_as(
            "SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, COUNT(*)
             FROM download_logs WHERE created_at >= $1
             GROUP BY 1",
        )
        .bind(window_start)
        .fetch_all(pool)
        .await?;

        let views: Vec<(String, i64)> = sqlx::query_as(
            "SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, COUNT(*)
             FROM view_logs WHERE created_at >= $1
             GROUP BY 1",
        )
        .bind(window_start)
        .fetch_all(pool)
        .await?;

        // BTreeMap keeps the YYYY-MM-DD keys in chronological order.
        let mut merged: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for (day, count) in downloads {
            merged.entry(day).or_default().0 = count;
        }
        for (day, count) in views {
            merged.entry(day).or_default().1 = count;
        }

        Ok(merged
            .into_iter()
            .map(|(date, (downloads, views))| DailyAnalytics {
                date,
                downloads,
                views,
            })
            .collect())
    }

    /// Engagement report for one template.
    pub async fn template_analytics(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<TemplateAnalytics, sqlx::Error> {
        let recent_start = Utc::now() - chrono::Duration::days(RECENT_WINDOW_DAYS);

        let row: (i64, i64, i64, i64, i64, Option<Timestamp>, Option<Timestamp>) =
            sqlx::query_as(
                "SELECT
                    (SELECT COUNT(*) FROM download_logs WHERE template_id = $1),
                    (SELECT COUNT(*) FROM view_logs WHERE template_id = $1),
                    (SELECT COUNT(DISTINCT user_id) FROM download_logs WHERE template_id = $1),
                    (SELECT COUNT(*) FROM download_logs
                      WHERE template_id = $1 AND created_at >= $2),
                    (SELECT COUNT(*) FROM view_logs
                      WHERE template_id = $1 AND created_at >= $2),
                    (SELECT MIN(created_at) FROM download_logs WHERE template_id = $1),
                    (SELECT MAX(created_at) FROM download_logs WHERE template_id = $1)",
            )
            .bind(template_id)
            .bind(recent_start)
            .fetch_one(pool)
            .await?;

        let (total_downloads, total_views, unique_downloaders, recent_downloads, recent_views, first_download, last_download) =
            row;

        let conversion_rate = if total_views > 0 {
            total_downloads as f64 / total_views as f64 * 100.0
        } else {
            0.0
        };

        Ok(TemplateAnalytics {
            template_id,
            total_downloads,
            total_views,
            unique_downloaders,
            recent_downloads,
            recent_views,
            first_download,
            last_download,
            conversion_rate,
        })
    }

    /// Delete download logs recorded before `cutoff`. Returns the count deleted.
    pub async fn delete_download_logs_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM download_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete view logs recorded before `cutoff`. Returns the count deleted.
    pub async fn delete_view_logs_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM view_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Midnight UTC on the first day of the month containing `at`.
fn start_of_month(at: Timestamp) -> Timestamp {
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(at)
}

/// Count rows per calendar month since `window_start`, keyed by a
/// `"Mon YYYY"` label matching chrono's `%b %Y` format.
async fn monthly_counts(
    pool: &PgPool,
    table: &str,
    window_start: Timestamp,
) -> Result<HashMap<String, i64>, sqlx::Error> {
    let query = format!(
        "SELECT to_char(created_at AT TIME ZONE 'UTC', 'Mon YYYY') AS month, COUNT(*)
         FROM {table} WHERE created_at >= $1
         GROUP BY 1"
    );
    let rows: Vec<(String, i64)> = sqlx::query_as(&query)
        .bind(window_start)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}
