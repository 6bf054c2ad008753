//! Download/view log models and aggregate report shapes.

use serde::Serialize;
use sqlx::FromRow;
use tessera_core::types::{DbId, Timestamp};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Log rows
// ---------------------------------------------------------------------------

/// A row from the `download_logs` table. `created_at` is the download time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DownloadLog {
    pub id: DbId,
    pub template_id: DbId,
    pub user_id: DbId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `view_logs` table. `created_at` is the view time.
/// `user_id` is `None` for anonymous visitors.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ViewLog {
    pub id: DbId,
    pub template_id: DbId,
    pub user_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a template download.
#[derive(Debug, Clone)]
pub struct CreateDownloadLog {
    pub template_id: DbId,
    pub user_id: DbId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// DTO for recording a template view.
#[derive(Debug, Clone)]
pub struct CreateViewLog {
    pub template_id: DbId,
    pub user_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

// ---------------------------------------------------------------------------
// Aggregate report shapes
// ---------------------------------------------------------------------------

/// Headline counters for the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_templates: i64,
    pub total_downloads: i64,
    pub total_users: i64,
    pub premium_users: i64,
    pub verified_users: i64,
    pub templates_this_month: i64,
    pub downloads_this_month: i64,
    pub users_this_month: i64,
}

/// Per-month growth counters, labeled like `"Jan 2024"`.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct MonthlyAnalytics {
    pub month: String,
    pub templates: i64,
    pub downloads: i64,
    pub users: i64,
}

/// Download/view totals for one template, for the top-templates report.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct TemplateStats {
    pub template_id: DbId,
    pub template_title: String,
    pub download_count: i64,
    pub view_count: i64,
    /// Uploader display name, `"Unknown"` when the account is gone.
    pub uploaded_by: String,
    pub created_at: Timestamp,
}

/// Downloads and views for a single calendar day.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct DailyAnalytics {
    /// Day in `YYYY-MM-DD` form.
    pub date: String,
    pub downloads: i64,
    pub views: i64,
}

/// Engagement report for a single template.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TemplateAnalytics {
    pub template_id: DbId,
    pub total_downloads: i64,
    pub total_views: i64,
    pub unique_downloaders: i64,
    /// Downloads in the last 30 days.
    pub recent_downloads: i64,
    /// Views in the last 30 days.
    pub recent_views: i64,
    pub first_download: Option<Timestamp>,
    pub last_download: Option<Timestamp>,
    /// Downloads per view, as a percentage. Zero when there are no views.
    pub conversion_rate: f64,
}
