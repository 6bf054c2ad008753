//! Best-effort device classification from the User-Agent header.
//!
//! Substring matching only; UA strings lie and the session registry
//! treats the result as advisory display data, never as a security
//! signal. The [`DeviceClassifier`] trait keeps the sniffer swappable
//! for a real parser without touching session logic.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Fallback label when no pattern matches.
pub const UNKNOWN: &str = "Unknown";

/// Parsed device facts attached to a session at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeviceInfo {
    /// The raw User-Agent string as received.
    pub user_agent: String,
    /// Browser family: Chrome, Firefox, Safari, Edge, or Unknown.
    pub browser: String,
    /// Operating system: Windows, macOS, Linux, Android, iOS, or Unknown.
    pub os: String,
    /// Device class: Mobile, Tablet, or Desktop.
    pub device: String,
}

/// Classifies a User-Agent string into display-friendly device facts.
pub trait DeviceClassifier: Send + Sync {
    fn classify(&self, user_agent: &str) -> DeviceInfo;
}

/// Default substring-matching classifier.
///
/// First match wins, so a Chromium-based Edge UA (which contains both
/// `chrome` and `edg`) reports as Chrome. Device class falls through to
/// Desktop when nothing marks the UA as mobile or tablet.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentSniffer;

impl DeviceClassifier for UserAgentSniffer {
    fn classify(&self, user_agent: &str) -> DeviceInfo {
        let ua = user_agent.to_lowercase();

        let browser = if ua.contains("chrome") {
            "Chrome"
        } else if ua.contains("firefox") {
            "Firefox"
        } else if ua.contains("safari") {
            "Safari"
        } else if ua.contains("edge") {
            "Edge"
        } else {
            UNKNOWN
        };

        let os = if ua.contains("windows") {
            "Windows"
        } else if ua.contains("mac") {
            "macOS"
        } else if ua.contains("linux") {
            "Linux"
        } else if ua.contains("android") {
            "Android"
        } else if ua.contains("ios") {
            "iOS"
        } else {
            UNKNOWN
        };

        let device = if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
            "Mobile"
        } else if ua.contains("tablet") || ua.contains("ipad") {
            "Tablet"
        } else {
            "Desktop"
        };

        DeviceInfo {
            user_agent: user_agent.to_string(),
            browser: browser.to_string(),
            os: os.to_string(),
            device: device.to_string(),
        }
    }
}
