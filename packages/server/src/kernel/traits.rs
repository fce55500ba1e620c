// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Services own ordering and compensating actions; stores expose
// statement-granular operations so those compensations stay possible.
//
// Naming convention: Base* for trait names (e.g., BaseSetupStore)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domains::images::{ImageAnalysisRecord, TankImage};
use crate::domains::setups::{AnalysisRecord, LivestockRow, SetupRow};

/// Errors surfaced by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("image limit reached")]
    LimitExceeded,
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Setup Store (Infrastructure - tank setups, livestock, setup analyses)
// =============================================================================

#[async_trait]
pub trait BaseSetupStore: Send + Sync {
    /// Insert a new setup row
    async fn insert_setup(&self, row: SetupRow) -> StoreResult<SetupRow>;

    /// Replace an existing setup row, keyed by id and owner
    async fn update_setup(&self, row: SetupRow) -> StoreResult<SetupRow>;

    async fn get_setup(&self, id: Uuid, user_id: Uuid) -> StoreResult<SetupRow>;

    /// All setups for a user, newest first
    async fn list_setups(&self, user_id: Uuid) -> StoreResult<Vec<SetupRow>>;

    /// Remove a setup together with its livestock and analyses
    async fn delete_setup(&self, id: Uuid, user_id: Uuid) -> StoreResult<()>;

    async fn insert_fish(&self, setup_id: Uuid, rows: &[LivestockRow]) -> StoreResult<()>;

    async fn insert_corals(&self, setup_id: Uuid, rows: &[LivestockRow]) -> StoreResult<()>;

    /// Drop all livestock rows for a setup (update path)
    async fn clear_livestock(&self, setup_id: Uuid) -> StoreResult<()>;

    async fn fish_for(&self, setup_id: Uuid) -> StoreResult<Vec<LivestockRow>>;

    async fn corals_for(&self, setup_id: Uuid) -> StoreResult<Vec<LivestockRow>>;

    async fn insert_analysis(&self, record: AnalysisRecord) -> StoreResult<()>;

    /// Most recent analysis for a setup, if any
    async fn latest_analysis(&self, setup_id: Uuid) -> StoreResult<Option<AnalysisRecord>>;

    /// A user's analyses joined with their setup rows, newest first
    async fn list_analyses(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> StoreResult<Vec<(AnalysisRecord, SetupRow)>>;
}

// =============================================================================
// Image Store (Infrastructure - image metadata and the analysis cache)
// =============================================================================

#[async_trait]
pub trait BaseImageStore: Send + Sync {
    async fn count_for_user(&self, user_id: Uuid) -> StoreResult<usize>;

    /// Conditional insert: fails with `LimitExceeded` when the user already
    /// holds `cap` images. The count check and the insert happen atomically.
    async fn insert_image(&self, image: TankImage, cap: usize) -> StoreResult<TankImage>;

    async fn get_image(&self, id: Uuid, user_id: Uuid) -> StoreResult<TankImage>;

    /// All images for a user, newest upload first
    async fn list_images(&self, user_id: Uuid) -> StoreResult<Vec<TankImage>>;

    async fn delete_image(&self, id: Uuid, user_id: Uuid) -> StoreResult<()>;

    async fn cached_analysis(&self, image_id: Uuid) -> StoreResult<Option<ImageAnalysisRecord>>;

    /// First write wins: a record already cached for the image is kept and
    /// returned unchanged
    async fn insert_analysis(&self, record: ImageAnalysisRecord)
        -> StoreResult<ImageAnalysisRecord>;

    /// Drop the cached analysis for an image; missing is not an error
    async fn delete_analysis(&self, image_id: Uuid) -> StoreResult<()>;

    /// A user's image analyses joined with their image rows, newest first
    async fn list_analyses(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> StoreResult<Vec<(ImageAnalysisRecord, TankImage)>>;
}

// =============================================================================
// Object Store (Infrastructure - raw image bytes)
// =============================================================================

#[async_trait]
pub trait BaseObjectStore: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()>;

    async fn fetch(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Removing a missing object is not an error
    async fn remove(&self, path: &str) -> StoreResult<()>;

    /// Time-limited URL for client-side display
    async fn signed_url(&self, path: &str, ttl_secs: u64) -> StoreResult<String>;
}
