//! Handlers for the `/templates` resource: public browsing, admin uploads,
//! owner management, and the premium-gated download/screenshot operations.

use std::io::Cursor;
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use image::ImageReader;
use serde::Serialize;
use tessera_core::access::{self, AccessInfo};
use tessera_core::error::CoreError;
use tessera_core::roles;
use tessera_core::types::DbId;
use tessera_core::validation::{validate_description, validate_title};
use tessera_db::models::analytics::{CreateDownloadLog, CreateViewLog};
use tessera_db::models::template::{
    CreateTemplate, TemplatePage, TemplateResponse, UpdateTemplate,
};
use tessera_db::repositories::{AnalyticsRepo, TemplateRepo};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::middleware::rbac::{RequireAdmin, RequirePremium};
use crate::query::PageParams;
use crate::response::MessageResponse;
use crate::state::AppState;

use super::utils::{client_ip, user_agent};

/// Content types accepted for template images.
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for `GET /templates/access-info`.
#[derive(Debug, Serialize)]
pub struct AccessInfoResponse {
    #[serde(flatten)]
    pub access: AccessInfo,
    /// Raw premium flag, separate from the derived capability.
    pub is_premium: bool,
}

/// Response body for `POST /templates/{id}/check-screenshot`.
#[derive(Debug, Serialize)]
pub struct ScreenshotPermission {
    pub can_screenshot: bool,
    pub template_id: DbId,
    /// Which entitlement granted access: `"premium"` or `"admin"`.
    pub user_access: &'static str,
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/templates
///
/// Public paginated listing, newest first.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<TemplatePage>> {
    let (page, per_page, offset) = params.resolve();

    let total = TemplateRepo::count(&state.pool).await?;
    let templates = TemplateRepo::list_page(&state.pool, offset, per_page).await?;

    Ok(Json(build_page(templates, total, page, per_page)))
}

/// GET /api/v1/templates/{id}
///
/// Public single-template fetch. Records a view, anonymously when the
/// requester holds no valid token.
pub async fn get_template(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(template_id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<Json<TemplateResponse>> {
    let template = TemplateRepo::find_listing_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Template")))?;

    // View logging is best-effort; a failed insert never fails the fetch.
    let log = CreateViewLog {
        template_id,
        user_id: viewer.map(|u| u.id),
        ip_address: client_ip(&headers),
        user_agent: user_agent_opt(&headers),
    };
    if let Err(err) = AnalyticsRepo::log_view(&state.pool, &log).await {
        tracing::warn!(error = %err, template_id, "Failed to record template view");
    }

    Ok(Json(template))
}

// ---------------------------------------------------------------------------
// Authenticated handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/templates
///
/// Admin-only creation. Multipart form with `title`, optional `description`,
/// and an `image` file part. The image's declared content type and actual
/// bytes must both match an allowed image format.
pub async fn create_template(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<TemplateResponse>)> {
    // 1. Pull the form fields.
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut image: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                title = Some(text);
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                description = Some(text).filter(|d| !d.is_empty());
            }
            "image" => {
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                image = Some((content_type, data.to_vec()));
            }
            _ => {} // ignore unknown fields
        }
    }

    let title = title.ok_or_else(|| AppError::BadRequest("Missing required 'title' field".into()))?;
    let (content_type, data) =
        image.ok_or_else(|| AppError::BadRequest("Missing required 'image' field".into()))?;

    // 2. Validate the text fields.
    validate_title(&title)?;
    validate_description(description.as_deref())?;

    // 3. The declared content type must be on the allow list.
    let content_type = content_type.unwrap_or_default();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "File type {content_type} not allowed. Allowed types: {ALLOWED_IMAGE_TYPES:?}"
        )));
    }

    // 4. Enforce the size cap.
    let max_size = state.config.uploads.max_file_size;
    if data.len() > max_size {
        return Err(AppError::BadRequest(format!(
            "File size {} bytes exceeds maximum allowed size of {max_size} bytes",
            data.len()
        )));
    }

    // 5. Sniff the actual bytes; a spoofed content type is rejected here.
    let format = image::guess_format(&data).map_err(|_| {
        AppError::BadRequest("File content does not match an allowed image type".into())
    })?;
    if !ALLOWED_IMAGE_TYPES.contains(&format.to_mime_type()) {
        return Err(AppError::BadRequest(
            "File content does not match an allowed image type".into(),
        ));
    }
    let dimensions = ImageReader::with_format(Cursor::new(&data), format)
        .into_dimensions()
        .ok();

    // 6. Store under a UUID filename derived from the sniffed format.
    let extension = format.extensions_str().first().copied().unwrap_or("jpg");
    let filename = format!("{}.{extension}", Uuid::new_v4());
    let upload_dir = PathBuf::from(&state.config.uploads.dir);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
    tokio::fs::write(upload_dir.join(&filename), &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    // 7. Persist the row and respond with the uploader's display name.
    let input = CreateTemplate {
        title,
        description,
        image_url: format!("/uploads/{filename}"),
        file_size: data.len() as i64,
        width: dimensions.map(|(w, _)| w as i32),
        height: dimensions.map(|(_, h)| h as i32),
        uploaded_by: current.user.id,
    };
    let template = TemplateRepo::create(&state.pool, &input).await?;

    let response = TemplateResponse::from_template(&template, current.user.display_name());
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/templates/{id}
///
/// Update title/description. Owner or admin only.
pub async fn update_template(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(template_id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<Json<TemplateResponse>> {
    let template = TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Template")))?;

    if template.uploaded_by != current.user.id && !roles::is_admin(&current.user.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to update this template".into(),
        )));
    }

    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    validate_description(input.description.as_deref())?;

    let updated = TemplateRepo::update(&state.pool, template_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Template")))?;

    Ok(Json(TemplateResponse::from_template(&updated, "You")))
}

/// DELETE /api/v1/templates/{id}
///
/// Delete a template and its stored image. Owner or admin only.
pub async fn delete_template(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let template = TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Template")))?;

    if template.uploaded_by != current.user.id && !roles::is_admin(&current.user.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to delete this template".into(),
        )));
    }

    // Remove the stored image first, best-effort.
    let path = stored_file_path(&state, &template.image_url);
    if let Err(err) = tokio::fs::remove_file(&path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %err, template_id, "Failed to delete template image");
        }
    }

    if !TemplateRepo::delete(&state.pool, template_id).await? {
        return Err(AppError::Core(CoreError::NotFound("Template")));
    }

    Ok(Json(MessageResponse::new("Template deleted successfully")))
}

/// GET /api/v1/templates/my/templates
///
/// Paginated listing of the requester's own uploads.
pub async fn my_templates(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<TemplatePage>> {
    let (page, per_page, offset) = params.resolve();

    let total = TemplateRepo::count_for_user(&state.pool, current.user.id).await?;
    let rows = TemplateRepo::list_for_user(&state.pool, current.user.id, offset, per_page).await?;

    let templates = rows
        .iter()
        .map(|t| TemplateResponse::from_template(t, "You"))
        .collect();

    Ok(Json(build_page(templates, total, page, per_page)))
}

/// GET /api/v1/templates/access-info
///
/// The requester's capability view, derived from the freshly loaded user row.
pub async fn access_info(current: CurrentUser) -> Json<AccessInfoResponse> {
    let user = &current.user;
    Json(AccessInfoResponse {
        access: access::access_info(&user.role, user.is_premium),
        is_premium: user.is_premium,
    })
}

// ---------------------------------------------------------------------------
// Premium-gated handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/templates/{id}/check-screenshot
///
/// Gate verdict for client-side screenshot features. Denied requesters get
/// the 402 upgrade payload from the gate extractor.
pub async fn check_screenshot(
    RequirePremium(current): RequirePremium,
    Path(template_id): Path<DbId>,
) -> Json<ScreenshotPermission> {
    // The extractor admitted the requester, so this is premium or admin.
    let user_access = if current.user.is_premium {
        "premium"
    } else {
        "admin"
    };

    Json(ScreenshotPermission {
        can_screenshot: true,
        template_id,
        user_access,
    })
}

/// GET /api/v1/templates/premium/available
///
/// The public listing with per-item premium capability markers.
pub async fn premium_templates(
    State(state): State<AppState>,
    RequirePremium(_current): RequirePremium,
    Query(params): Query<PageParams>,
) -> AppResult<Json<TemplatePage>> {
    let (page, per_page, offset) = params.resolve();

    let total = TemplateRepo::count(&state.pool).await?;
    let templates = TemplateRepo::list_page(&state.pool, offset, per_page)
        .await?
        .into_iter()
        .map(TemplateResponse::with_premium_access)
        .collect();

    Ok(Json(build_page(templates, total, page, per_page)))
}

/// GET /api/v1/templates/{id}/download
///
/// Serve the stored image as an attachment. Premium or admin only.
pub async fn download_template(
    State(state): State<AppState>,
    RequirePremium(current): RequirePremium,
    Path(template_id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<(HeaderMap, Body)> {
    // 1. Resolve the template and its stored file.
    let template = TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Template")))?;

    let path = stored_file_path(&state, &template.image_url);
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::Core(CoreError::NotFound("Template file")));
        }
        Err(err) => {
            return Err(AppError::InternalError(format!(
                "Failed to read template file: {err}"
            )));
        }
    };

    // 2. Record the download, best-effort.
    let log = CreateDownloadLog {
        template_id,
        user_id: current.user.id,
        ip_address: client_ip(&headers),
        user_agent: user_agent_opt(&headers),
    };
    if let Err(err) = AnalyticsRepo::log_download(&state.pool, &log).await {
        tracing::warn!(error = %err, template_id, "Failed to record template download");
    }

    // 3. Serve as an attachment named after the template.
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let safe_title: String = template
        .title
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let disposition = format!("attachment; filename=\"{safe_title}_{filename}\"");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    response_headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::InternalError(format!("Invalid download name: {e}")))?,
    );

    Ok((response_headers, Body::from(data)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Assemble a listing page envelope.
fn build_page(
    templates: Vec<TemplateResponse>,
    total: i64,
    page: i64,
    per_page: i64,
) -> TemplatePage {
    TemplatePage {
        templates,
        total,
        page,
        per_page,
        total_pages: (total + per_page - 1) / per_page,
    }
}

/// Filesystem path of a stored upload from its public `/uploads/...` URL.
fn stored_file_path(state: &AppState, image_url: &str) -> PathBuf {
    let filename = image_url.strip_prefix("/uploads/").unwrap_or(image_url);
    PathBuf::from(&state.config.uploads.dir).join(filename)
}

/// The `User-Agent` header as an owned option, empty values dropped.
fn user_agent_opt(headers: &HeaderMap) -> Option<String> {
    Some(user_agent(headers).to_string()).filter(|ua| !ua.is_empty())
}
