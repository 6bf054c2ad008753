//! Login session model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tessera_core::device::DeviceInfo;
use tessera_core::types::{DbId, Timestamp};
use ts_rs::TS;

/// A login session row from the `sessions` table.
///
/// One row is created per sign-in. The device columns are denormalized from
/// the classified user agent so session listings need no re-parsing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub user_agent: String,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub ip_address: Option<String>,
    pub is_active: bool,
    pub last_activity: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// Reassemble the device classification stored on this row.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            user_agent: self.user_agent.clone(),
            browser: self.browser.clone(),
            os: self.os.clone(),
            device: self.device.clone(),
        }
    }
}

/// DTO for creating a new session at sign-in.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub device: DeviceInfo,
    pub ip_address: Option<String>,
}

/// Session representation for the device-management listing.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SessionResponse {
    pub id: DbId,
    pub device_info: DeviceInfo,
    pub ip_address: Option<String>,
    pub is_active: bool,
    pub last_activity: Timestamp,
    pub created_at: Timestamp,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        SessionResponse {
            id: session.id,
            device_info: session.device_info(),
            ip_address: session.ip_address.clone(),
            is_active: session.is_active,
            last_activity: session.last_activity,
            created_at: session.created_at,
        }
    }
}

/// Per-device and per-browser session counts for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionStats {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub inactive_sessions: i64,
    pub sessions_by_device: std::collections::HashMap<String, i64>,
    pub sessions_by_browser: std::collections::HashMap<String, i64>,
}
