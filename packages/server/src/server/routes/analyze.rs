//! Analysis endpoints: free-form descriptions, fresh uploads, saved images.

use axum::extract::{Extension, Multipart};
use axum::Json;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use analysis::{fallback_setup_report, AnalysisReport};

use crate::domains::images::validate_upload;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthState;

use super::error::{invalid_form, require_user, ApiError, ApiResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    tank_description: Option<String>,
}

/// Analyze a free-form tank description
///
/// Invoker failures degrade to HTTP 200 with a fallback report so the client
/// always has something to render; the report's `error` field marks it.
pub async fn analyze_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisReport>> {
    let description = request
        .tank_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("tankDescription is required".to_string()))?;

    match state.invoker.analyze_setup(&description).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            warn!(error = %e, "setup analysis failed, returning fallback report");
            Ok(Json(fallback_setup_report()))
        }
    }
}

/// Analyze an uploaded image without persisting it
///
/// Accepts a multipart form with an `image` file and an optional
/// `tankDescription` text field.
pub async fn analyze_image_handler(
    Extension(state): Extension<AxumAppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisReport>> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|_| invalid_form())? {
        match field.name() {
            Some("image") => {
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|_| invalid_form())?;
                image = Some((content_type, bytes.to_vec()));
            }
            Some("tankDescription") => {
                description = Some(field.text().await.map_err(|_| invalid_form())?);
            }
            _ => {}
        }
    }

    let (content_type, bytes) =
        image.ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;
    validate_upload(&content_type, bytes.len())?;

    let report = state
        .invoker
        .analyze_image(&content_type, &bytes, description.as_deref())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(report))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeSavedImageRequest {
    #[serde(default)]
    image_id: Option<String>,
}

/// Analyze a previously uploaded image, serving the cached result when one
/// exists (auth required)
pub async fn analyze_saved_image_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    Json(request): Json<AnalyzeSavedImageRequest>,
) -> ApiResult<Json<AnalysisReport>> {
    let user = require_user(&auth)?;

    let raw_id = request
        .image_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Image ID is required".to_string()))?;
    // Unparseable ids behave like ids that do not exist
    let image_id = Uuid::parse_str(&raw_id)
        .map_err(|_| ApiError::NotFound("Image not found".to_string()))?;

    let report = state.images.analyze_saved(user.user_id, image_id).await?;
    Ok(Json(report))
}
