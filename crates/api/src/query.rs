//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for listing endpoints.
const DEFAULT_PER_PAGE: i64 = 10;

/// Upper bound on the page size a client may request.
const MAX_PER_PAGE: i64 = 100;

/// 1-based pagination parameters (`?page=&per_page=`).
///
/// Used by the template listing endpoints. Out-of-range values are clamped
/// rather than rejected.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    /// Resolve to `(page, per_page, offset)` with defaults applied.
    pub fn resolve(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page, (page - 1) * per_page)
    }
}
