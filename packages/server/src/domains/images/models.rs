use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use analysis::{AnalysisReport, Breakdown};

/// Uploaded image metadata
///
/// `filename` is the generated storage name; `original_filename` is what the
/// client sent. The bytes themselves live in the object store at `file_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankImage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub description: String,
    pub file_size: i64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Listing entry: image metadata plus a short-lived signed URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankImageView {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
    pub file_size: i64,
    pub file_path: String,
    pub url: Option<String>,
}

impl TankImageView {
    pub fn new(image: TankImage, url: Option<String>) -> Self {
        Self {
            id: image.id,
            filename: image.filename,
            original_filename: image.original_filename,
            description: image.description,
            uploaded_at: image.uploaded_at,
            file_size: image.file_size,
            file_path: image.file_path,
            url,
        }
    }
}

/// Cached analysis for an image, keyed by image id. One record per image;
/// the first write wins and there is no expiry.
#[derive(Debug, Clone)]
pub struct ImageAnalysisRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_id: Uuid,
    pub report: AnalysisReport,
    pub analyzed_at: DateTime<Utc>,
}

/// Image analysis history entry joined with its image row
#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysisEntry {
    pub id: Uuid,
    pub image_filename: String,
    pub original_filename: String,
    pub image_url: Option<String>,
    pub score: i64,
    pub summary: String,
    pub breakdown: Breakdown,
    pub analyzed_at: DateTime<Utc>,
}
