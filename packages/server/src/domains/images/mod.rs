//! Images domain - uploaded tank photos and cached vision analyses
//!
//! Responsibilities:
//! - Capped per-user uploads with type and size validation
//! - Object storage alongside metadata rows, with orphan cleanup
//! - Per-image analysis cache (first write wins, no expiry)

pub mod models;
pub mod service;

pub use models::{ImageAnalysisEntry, ImageAnalysisRecord, TankImage, TankImageView};
pub use service::{
    validate_upload, ImageError, ImageService, ALLOWED_IMAGE_TYPES, MAX_IMAGES_PER_USER,
    MAX_IMAGE_BYTES, SIGNED_URL_TTL_SECS,
};
