//! Image upload, listing, deletion, and saved-image analysis.
//!
//! Uploads are capped per user and validated before any bytes are stored.
//! Analyzing a saved image consults the per-image cache first; a provider
//! call only happens on a miss, and persisting the result is non-fatal.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use analysis::{AnalysisInvoker, AnalysisReport};
use openai_client::OpenAIError;

use crate::kernel::{BaseImageStore, BaseObjectStore, StoreError};

use super::models::{ImageAnalysisEntry, ImageAnalysisRecord, TankImage, TankImageView};

/// Hard cap on stored images per user
pub const MAX_IMAGES_PER_USER: usize = 5;

/// Upload size ceiling in bytes
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted upload MIME types
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Signed URL lifetime used in listings and history
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Maximum of 5 images allowed per user")]
    LimitReached,
    #[error("Invalid file type. Only JPEG, PNG, and WebP images are allowed.")]
    InvalidType,
    #[error("File too large. Maximum size is 10MB.")]
    TooLarge,
    #[error("Image not found")]
    NotFound,
    #[error("Failed to download image")]
    Download,
    #[error("image analysis failed: {0}")]
    Analysis(#[from] OpenAIError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ImageError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ImageError::NotFound,
            StoreError::LimitExceeded => ImageError::LimitReached,
            other => ImageError::Store(other),
        }
    }
}

/// Reject files that are not browser image types or exceed the size cap
pub fn validate_upload(content_type: &str, size: usize) -> Result<(), ImageError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ImageError::InvalidType);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge);
    }
    Ok(())
}

pub struct ImageService {
    images: Arc<dyn BaseImageStore>,
    objects: Arc<dyn BaseObjectStore>,
    invoker: Arc<AnalysisInvoker>,
}

impl ImageService {
    pub fn new(
        images: Arc<dyn BaseImageStore>,
        objects: Arc<dyn BaseObjectStore>,
        invoker: Arc<AnalysisInvoker>,
    ) -> Self {
        Self {
            images,
            objects,
            invoker,
        }
    }

    /// Store an uploaded image and its metadata
    pub async fn upload(
        &self,
        user_id: Uuid,
        original_filename: String,
        content_type: String,
        bytes: Vec<u8>,
        description: String,
    ) -> Result<TankImage, ImageError> {
        // Early cap check so oversized uploads from maxed-out users fail fast;
        // the insert re-checks under the store lock
        if self.images.count_for_user(user_id).await? >= MAX_IMAGES_PER_USER {
            return Err(ImageError::LimitReached);
        }
        validate_upload(&content_type, bytes.len())?;

        let ext = original_filename.rsplit('.').next().unwrap_or("");
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = format!("tank-images/{}/{}", user_id, filename);
        let file_size = bytes.len() as i64;
        self.objects.put(&file_path, bytes, &content_type).await?;

        let image = TankImage {
            id: Uuid::new_v4(),
            user_id,
            filename,
            original_filename,
            file_path: file_path.clone(),
            description,
            file_size,
            content_type,
            uploaded_at: Utc::now(),
        };
        match self.images.insert_image(image, MAX_IMAGES_PER_USER).await {
            Ok(stored) => {
                debug!(image_id = %stored.id, user_id = %user_id, "stored tank image");
                Ok(stored)
            }
            Err(e) => {
                // Remove the orphaned object when the metadata insert fails
                if let Err(remove_err) = self.objects.remove(&file_path).await {
                    warn!(error = %remove_err, path = %file_path, "failed to remove orphaned object");
                }
                Err(e.into())
            }
        }
    }

    /// A user's images with signed URLs, newest upload first
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<TankImageView>, ImageError> {
        let images = self.images.list_images(user_id).await?;
        let mut views = Vec::with_capacity(images.len());
        for image in images {
            let url = self.sign(&image.file_path).await;
            views.push(TankImageView::new(image, url));
        }
        Ok(views)
    }

    /// Delete an image, its stored object, and any cached analysis
    pub async fn delete(&self, user_id: Uuid, image_id: Uuid) -> Result<(), ImageError> {
        let image = self.images.get_image(image_id, user_id).await?;

        // Storage failures are logged but do not block the metadata delete
        if let Err(e) = self.objects.remove(&image.file_path).await {
            error!(error = %e, path = %image.file_path, "storage deletion failed");
        }
        self.images.delete_image(image_id, user_id).await?;
        if let Err(e) = self.images.delete_analysis(image_id).await {
            warn!(error = %e, image_id = %image_id, "failed to drop cached analysis");
        }
        Ok(())
    }

    /// Analyze a previously uploaded image, serving from cache when possible
    pub async fn analyze_saved(
        &self,
        user_id: Uuid,
        image_id: Uuid,
    ) -> Result<AnalysisReport, ImageError> {
        let image = self.images.get_image(image_id, user_id).await?;

        if let Some(record) = self.images.cached_analysis(image_id).await? {
            debug!(image_id = %image_id, "returning cached image analysis");
            let mut report = record.report;
            report.cached = Some(true);
            return Ok(report);
        }

        let bytes = self
            .objects
            .fetch(&image.file_path)
            .await
            .map_err(|_| ImageError::Download)?;
        let report = self
            .invoker
            .analyze_image(&image.content_type, &bytes, Some(&image.description))
            .await?;

        let record = ImageAnalysisRecord {
            id: Uuid::new_v4(),
            user_id,
            image_id,
            report: report.clone(),
            analyzed_at: Utc::now(),
        };
        // Caching the result is non-fatal
        if let Err(e) = self.images.insert_analysis(record).await {
            warn!(error = %e, image_id = %image_id, "failed to persist image analysis");
        }
        Ok(report)
    }

    /// A user's image analyses joined with image metadata, newest first
    pub async fn analysis_history(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ImageAnalysisEntry>, ImageError> {
        let rows = self.images.list_analyses(user_id, limit).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for (record, image) in rows {
            let image_url = self.sign(&image.file_path).await;
            entries.push(ImageAnalysisEntry {
                id: record.id,
                image_filename: image.filename,
                original_filename: image.original_filename,
                image_url,
                score: record.report.score,
                summary: record.report.summary,
                breakdown: record.report.breakdown,
                analyzed_at: record.analyzed_at,
            });
        }
        Ok(entries)
    }

    // Signer failures degrade to a null URL rather than failing the listing
    async fn sign(&self, path: &str) -> Option<String> {
        match self.objects.signed_url(path, SIGNED_URL_TTL_SECS).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, path = %path, "failed to create signed url");
                None
            }
        }
    }
}
