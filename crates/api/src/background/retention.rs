//! Periodic retention sweep for sessions, token records, and analytics logs.
//!
//! Spawns a background task that deactivates sessions idle past the refresh
//! lifetime, deletes token pairs old enough that their refresh half has
//! expired, and purges download/view logs past the configured retention
//! period. Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::auth::jwt::JwtConfig;
use tessera_db::repositories::analytics_repo::AnalyticsRepo;
use tessera_db::repositories::auth_token_repo::AuthTokenRepo;
use tessera_db::repositories::session_repo::SessionRepo;

/// Default analytics log retention period: one year.
const DEFAULT_LOG_RETENTION_DAYS: i64 = 365;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the retention sweep loop.
///
/// A session idle longer than the refresh-token lifetime can never be
/// refreshed again, so deactivating it only makes the bookkeeping match
/// reality. Log retention defaults to 365 days and can be overridden via
/// `LOG_RETENTION_DAYS`. Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, jwt: JwtConfig, cancel: CancellationToken) {
    let log_retention_days: i64 = std::env::var("LOG_RETENTION_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LOG_RETENTION_DAYS);

    tracing::info!(
        session_ttl_days = jwt.refresh_token_expiry_days,
        log_retention_days,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Retention job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let now = Utc::now();
                let idle_cutoff = now - chrono::Duration::days(jwt.refresh_token_expiry_days);
                let log_cutoff = now - chrono::Duration::days(log_retention_days);

                let sessions = SessionRepo::deactivate_idle_since(&pool, idle_cutoff)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::error!(error = %e, "Retention: session sweep failed");
                        0
                    });
                let tokens = AuthTokenRepo::delete_issued_before(&pool, idle_cutoff)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::error!(error = %e, "Retention: token sweep failed");
                        0
                    });
                let downloads = AnalyticsRepo::delete_download_logs_before(&pool, log_cutoff)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::error!(error = %e, "Retention: download log sweep failed");
                        0
                    });
                let views = AnalyticsRepo::delete_view_logs_before(&pool, log_cutoff)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::error!(error = %e, "Retention: view log sweep failed");
                        0
                    });

                if sessions + tokens + downloads + views > 0 {
                    tracing::info!(sessions, tokens, downloads, views, "Retention sweep purged rows");
                } else {
                    tracing::debug!("Retention sweep: nothing to purge");
                }
            }
        }
    }
}
