//! Image upload and management endpoints.

use axum::extract::{Extension, Multipart, Path};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domains::images::{TankImage, TankImageView};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthState;

use super::error::{invalid_form, require_user, ApiError, ApiResult};

#[derive(Serialize)]
pub struct UploadImageResponse {
    message: String,
    image: TankImage,
}

/// Upload a tank image (auth required, capped per user)
///
/// Accepts a multipart form with an `image` file and an optional
/// `description` text field.
pub async fn upload_image_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadImageResponse>> {
    let user = require_user(&auth)?;

    let mut upload: Option<(String, String, Vec<u8>)> = None;
    let mut description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|_| invalid_form())? {
        match field.name() {
            Some("image") => {
                let original_filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|_| invalid_form())?;
                upload = Some((original_filename, content_type, bytes.to_vec()));
            }
            Some("description") => {
                description = field.text().await.map_err(|_| invalid_form())?;
            }
            _ => {}
        }
    }

    let (original_filename, content_type, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;

    let image = state
        .images
        .upload(user.user_id, original_filename, content_type, bytes, description)
        .await?;

    Ok(Json(UploadImageResponse {
        message: "Image uploaded successfully".to_string(),
        image,
    }))
}

/// List the caller's uploaded images, newest first
pub async fn list_images_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
) -> ApiResult<Json<Vec<TankImageView>>> {
    let user = require_user(&auth)?;
    let images = state.images.list(user.user_id).await?;
    Ok(Json(images))
}

#[derive(Serialize)]
pub struct DeleteImageResponse {
    message: String,
}

/// Delete one of the caller's images together with its cached analysis
pub async fn delete_image_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteImageResponse>> {
    let user = require_user(&auth)?;

    // Unparseable ids behave like ids that do not exist
    let image_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::NotFound("Image not found".to_string()))?;
    state.images.delete(user.user_id, image_id).await?;

    Ok(Json(DeleteImageResponse {
        message: "Image deleted successfully".to_string(),
    }))
}
