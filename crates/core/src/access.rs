//! Premium access gate.
//!
//! Capability derivation is a pure function of `(role, is_premium)` so the
//! verdict can be recomputed from freshly loaded user state on every
//! request; a premium upgrade takes effect on the next request without
//! re-login. Admins bypass the premium flag entirely.

use serde::Serialize;
use ts_rs::TS;

use crate::roles;

/// Where a denied client should be sent to upgrade.
pub const UPGRADE_REDIRECT: &str = "/payment";

/// Machine-readable action hint attached to a denied verdict.
pub const UPGRADE_ACTION: &str = "upgrade_required";

/// Capability view for the current requester, shaped for clients.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct AccessInfo {
    pub has_premium_access: bool,
    pub can_download: bool,
    pub can_screenshot: bool,
    pub role: String,
    pub upgrade_required: bool,
}

/// True when the role/premium combination unlocks gated operations.
pub fn has_premium_access(role: &str, is_premium: bool) -> bool {
    roles::is_admin(role) || is_premium
}

/// Build the full capability view for a user.
pub fn access_info(role: &str, is_premium: bool) -> AccessInfo {
    let allowed = has_premium_access(role, is_premium);
    AccessInfo {
        has_premium_access: allowed,
        can_download: allowed,
        can_screenshot: allowed,
        role: role.to_string(),
        upgrade_required: !allowed,
    }
}
