//! Marketplace template model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tessera_core::types::{DbId, Timestamp};
use ts_rs::TS;

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Public URL path of the preview image, e.g. `/uploads/<uuid>.png`.
    pub image_url: String,
    /// Size in bytes of the stored preview image.
    pub file_size: i64,
    /// Pixel dimensions read from the image header, when decodable.
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new template after its image has been stored.
#[derive(Debug, Clone)]
pub struct CreateTemplate {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub uploaded_by: DbId,
}

/// DTO for updating an existing template. All fields are optional.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct UpdateTemplate {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Template representation for API responses.
///
/// `uploaded_by` carries the uploader's display name resolved via JOIN,
/// not the raw user ID. The premium indicator fields are absent from the
/// public listing and filled in on the premium one.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct TemplateResponse {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub uploaded_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub can_download: Option<bool>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub can_screenshot: Option<bool>,
    /// `"premium"` on the premium listing.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub access_level: Option<String>,
}

impl TemplateResponse {
    /// Build from a raw row plus an already-resolved uploader display name.
    pub fn from_template(template: &Template, uploaded_by: impl Into<String>) -> Self {
        Self {
            id: template.id,
            title: template.title.clone(),
            description: template.description.clone(),
            image_url: template.image_url.clone(),
            uploaded_by: uploaded_by.into(),
            created_at: template.created_at,
            updated_at: template.updated_at,
            can_download: None,
            can_screenshot: None,
            access_level: None,
        }
    }

    /// Mark the item with the premium capability indicators.
    pub fn with_premium_access(mut self) -> Self {
        self.can_download = Some(true);
        self.can_screenshot = Some(true);
        self.access_level = Some("premium".to_string());
        self
    }
}

/// One page of the public template listing.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TemplatePage {
    pub templates: Vec<TemplateResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}
