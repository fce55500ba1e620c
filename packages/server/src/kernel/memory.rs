//! In-memory store backing all three storage traits.
//!
//! Rows live in mutex-guarded collections; locks are held only for the
//! duration of one operation and never across an await point. The image
//! insert enforces the per-user cap under the same lock as the count, and
//! the analysis cache keeps the first record written for an image.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domains::images::{ImageAnalysisRecord, TankImage};
use crate::domains::setups::{AnalysisRecord, LivestockRow, SetupRow};

use super::traits::{
    BaseImageStore, BaseObjectStore, BaseSetupStore, StoreError, StoreResult,
};

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Default)]
pub struct MemoryStore {
    setups: Mutex<Vec<SetupRow>>,
    fish: Mutex<HashMap<Uuid, Vec<LivestockRow>>>,
    corals: Mutex<HashMap<Uuid, Vec<LivestockRow>>>,
    setup_analyses: Mutex<Vec<AnalysisRecord>>,
    images: Mutex<Vec<TankImage>>,
    image_analyses: Mutex<HashMap<Uuid, ImageAnalysisRecord>>,
    objects: Mutex<HashMap<String, StoredObject>>,
}

fn locked<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn setup_exists(&self, setup_id: Uuid) -> StoreResult<bool> {
        Ok(locked(&self.setups)?.iter().any(|s| s.id == setup_id))
    }
}

#[async_trait]
impl BaseSetupStore for MemoryStore {
    async fn insert_setup(&self, row: SetupRow) -> StoreResult<SetupRow> {
        locked(&self.setups)?.push(row.clone());
        Ok(row)
    }

    async fn update_setup(&self, row: SetupRow) -> StoreResult<SetupRow> {
        let mut setups = locked(&self.setups)?;
        let slot = setups
            .iter_mut()
            .find(|s| s.id == row.id && s.user_id == row.user_id)
            .ok_or(StoreError::NotFound)?;
        *slot = row.clone();
        Ok(row)
    }

    async fn get_setup(&self, id: Uuid, user_id: Uuid) -> StoreResult<SetupRow> {
        locked(&self.setups)?
            .iter()
            .find(|s| s.id == id && s.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_setups(&self, user_id: Uuid) -> StoreResult<Vec<SetupRow>> {
        let mut rows: Vec<SetupRow> = locked(&self.setups)?
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_setup(&self, id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let removed = {
            let mut setups = locked(&self.setups)?;
            let before = setups.len();
            setups.retain(|s| !(s.id == id && s.user_id == user_id));
            setups.len() < before
        };
        if !removed {
            return Err(StoreError::NotFound);
        }
        locked(&self.fish)?.remove(&id);
        locked(&self.corals)?.remove(&id);
        locked(&self.setup_analyses)?.retain(|r| r.tank_setup_id != id);
        Ok(())
    }

    async fn insert_fish(&self, setup_id: Uuid, rows: &[LivestockRow]) -> StoreResult<()> {
        if !self.setup_exists(setup_id)? {
            return Err(StoreError::NotFound);
        }
        locked(&self.fish)?
            .entry(setup_id)
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    async fn insert_corals(&self, setup_id: Uuid, rows: &[LivestockRow]) -> StoreResult<()> {
        if !self.setup_exists(setup_id)? {
            return Err(StoreError::NotFound);
        }
        locked(&self.corals)?
            .entry(setup_id)
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    async fn clear_livestock(&self, setup_id: Uuid) -> StoreResult<()> {
        locked(&self.fish)?.remove(&setup_id);
        locked(&self.corals)?.remove(&setup_id);
        Ok(())
    }

    async fn fish_for(&self, setup_id: Uuid) -> StoreResult<Vec<LivestockRow>> {
        Ok(locked(&self.fish)?
            .get(&setup_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn corals_for(&self, setup_id: Uuid) -> StoreResult<Vec<LivestockRow>> {
        Ok(locked(&self.corals)?
            .get(&setup_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_analysis(&self, record: AnalysisRecord) -> StoreResult<()> {
        if !self.setup_exists(record.tank_setup_id)? {
            return Err(StoreError::NotFound);
        }
        locked(&self.setup_analyses)?.push(record);
        Ok(())
    }

    async fn latest_analysis(&self, setup_id: Uuid) -> StoreResult<Option<AnalysisRecord>> {
        let analyses = locked(&self.setup_analyses)?;
        // Insertion index breaks created_at ties in favor of the newer row
        Ok(analyses
            .iter()
            .enumerate()
            .filter(|(_, r)| r.tank_setup_id == setup_id)
            .max_by_key(|(i, r)| (r.created_at, *i))
            .map(|(_, r)| r.clone()))
    }

    async fn list_analyses(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> StoreResult<Vec<(AnalysisRecord, SetupRow)>> {
        let setup_rows: HashMap<Uuid, SetupRow> = locked(&self.setups)?
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| (s.id, s.clone()))
            .collect();
        let mut joined: Vec<(AnalysisRecord, SetupRow)> = locked(&self.setup_analyses)?
            .iter()
            .filter_map(|r| {
                setup_rows
                    .get(&r.tank_setup_id)
                    .map(|s| (r.clone(), s.clone()))
            })
            .collect();
        joined.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        joined.truncate(limit);
        Ok(joined)
    }
}

#[async_trait]
impl BaseImageStore for MemoryStore {
    async fn count_for_user(&self, user_id: Uuid) -> StoreResult<usize> {
        Ok(locked(&self.images)?
            .iter()
            .filter(|i| i.user_id == user_id)
            .count())
    }

    async fn insert_image(&self, image: TankImage, cap: usize) -> StoreResult<TankImage> {
        let mut images = locked(&self.images)?;
        let held = images.iter().filter(|i| i.user_id == image.user_id).count();
        if held >= cap {
            return Err(StoreError::LimitExceeded);
        }
        images.push(image.clone());
        Ok(image)
    }

    async fn get_image(&self, id: Uuid, user_id: Uuid) -> StoreResult<TankImage> {
        locked(&self.images)?
            .iter()
            .find(|i| i.id == id && i.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_images(&self, user_id: Uuid) -> StoreResult<Vec<TankImage>> {
        let mut rows: Vec<TankImage> = locked(&self.images)?
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(rows)
    }

    async fn delete_image(&self, id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut images = locked(&self.images)?;
        let before = images.len();
        images.retain(|i| !(i.id == id && i.user_id == user_id));
        if images.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn cached_analysis(&self, image_id: Uuid) -> StoreResult<Option<ImageAnalysisRecord>> {
        Ok(locked(&self.image_analyses)?.get(&image_id).cloned())
    }

    async fn insert_analysis(
        &self,
        record: ImageAnalysisRecord,
    ) -> StoreResult<ImageAnalysisRecord> {
        let mut cache = locked(&self.image_analyses)?;
        Ok(cache.entry(record.image_id).or_insert(record).clone())
    }

    async fn delete_analysis(&self, image_id: Uuid) -> StoreResult<()> {
        locked(&self.image_analyses)?.remove(&image_id);
        Ok(())
    }

    async fn list_analyses(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> StoreResult<Vec<(ImageAnalysisRecord, TankImage)>> {
        let image_rows: HashMap<Uuid, TankImage> = locked(&self.images)?
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| (i.id, i.clone()))
            .collect();
        let mut joined: Vec<(ImageAnalysisRecord, TankImage)> = locked(&self.image_analyses)?
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| image_rows.get(&r.image_id).map(|i| (r.clone(), i.clone())))
            .collect();
        joined.sort_by(|a, b| b.0.analyzed_at.cmp(&a.0.analyzed_at));
        joined.truncate(limit);
        Ok(joined)
    }
}

#[async_trait]
impl BaseObjectStore for MemoryStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        locked(&self.objects)?.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn fetch(&self, path: &str) -> StoreResult<Vec<u8>> {
        locked(&self.objects)?
            .get(path)
            .map(|o| o.bytes.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        locked(&self.objects)?.remove(path);
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl_secs: u64) -> StoreResult<String> {
        let objects = locked(&self.objects)?;
        let object = objects.get(path).ok_or(StoreError::NotFound)?;
        Ok(format!(
            "memory://{}?content_type={}&expires_in={}",
            path, object.content_type, ttl_secs
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::{TankSetup, WaterParams};
    use chrono::{Duration, Utc};

    fn setup_row(user_id: Uuid, name: &str) -> SetupRow {
        let setup = TankSetup {
            volume: 100.0,
            lighting: "t5".to_string(),
            filtration: vec![],
            has_protein_skimmer: false,
            has_heater: true,
            has_wavemaker: false,
            fish: vec![],
            corals: vec![],
            water_params: WaterParams::default(),
        };
        SetupRow::new(user_id, name.to_string(), &setup)
    }

    fn image_row(user_id: Uuid, name: &str) -> TankImage {
        TankImage {
            id: Uuid::new_v4(),
            user_id,
            filename: format!("{}.jpg", Uuid::new_v4()),
            original_filename: name.to_string(),
            file_path: format!("tank-images/{}/{}", user_id, name),
            description: String::new(),
            file_size: 4,
            content_type: "image/jpeg".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    fn analysis_record(setup_id: Uuid, score: i64) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            tank_setup_id: setup_id,
            score,
            summary: None,
            general_assessment: None,
            breakdown: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_delete_setup_cascades() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let row = store.insert_setup(setup_row(user, "Tank")).await.unwrap();
        store
            .insert_fish(
                row.id,
                &[LivestockRow {
                    species_id: "clownfish".to_string(),
                    quantity: 2,
                }],
            )
            .await
            .unwrap();
        BaseSetupStore::insert_analysis(&store, analysis_record(row.id, 80))
            .await
            .unwrap();

        store.delete_setup(row.id, user).await.unwrap();

        assert!(store.fish_for(row.id).await.unwrap().is_empty());
        assert!(store.latest_analysis(row.id).await.unwrap().is_none());
        assert!(matches!(
            store.get_setup(row.id, user).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_setups_newest_first() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let mut older = setup_row(user, "Older");
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = setup_row(user, "Newer");

        store.insert_setup(older).await.unwrap();
        store.insert_setup(newer).await.unwrap();

        let listed = store.list_setups(user).await.unwrap();
        assert_eq!(listed[0].name, "Newer");
        assert_eq!(listed[1].name, "Older");
    }

    #[tokio::test]
    async fn test_latest_analysis_breaks_ties_by_insertion() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let row = store.insert_setup(setup_row(user, "Tank")).await.unwrap();

        let when = Utc::now();
        let mut first = analysis_record(row.id, 70);
        first.created_at = when;
        let mut second = analysis_record(row.id, 90);
        second.created_at = when;

        BaseSetupStore::insert_analysis(&store, first).await.unwrap();
        BaseSetupStore::insert_analysis(&store, second).await.unwrap();

        let latest = store.latest_analysis(row.id).await.unwrap().unwrap();
        assert_eq!(latest.score, 90);
    }

    #[tokio::test]
    async fn test_insert_fish_requires_setup() {
        let store = MemoryStore::new();
        let result = store
            .insert_fish(
                Uuid::new_v4(),
                &[LivestockRow {
                    species_id: "goby".to_string(),
                    quantity: 1,
                }],
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_image_cap_enforced_at_insert() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        for i in 0..3 {
            store
                .insert_image(image_row(user, &format!("img-{i}.jpg")), 3)
                .await
                .unwrap();
        }
        let result = store.insert_image(image_row(user, "img-3.jpg"), 3).await;
        assert!(matches!(result, Err(StoreError::LimitExceeded)));

        // The cap is per user
        store
            .insert_image(image_row(Uuid::new_v4(), "other.jpg"), 3)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_image_analysis_first_write_wins() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let image = store.insert_image(image_row(user, "reef.jpg"), 5).await.unwrap();

        let report = analysis::fallback_setup_report();
        let first = ImageAnalysisRecord {
            id: Uuid::new_v4(),
            user_id: user,
            image_id: image.id,
            report: report.clone(),
            analyzed_at: Utc::now(),
        };
        let second = ImageAnalysisRecord {
            id: Uuid::new_v4(),
            user_id: user,
            image_id: image.id,
            report,
            analyzed_at: Utc::now(),
        };

        let kept_first = BaseImageStore::insert_analysis(&store, first.clone())
            .await
            .unwrap();
        let kept_second = BaseImageStore::insert_analysis(&store, second)
            .await
            .unwrap();
        assert_eq!(kept_first.id, first.id);
        assert_eq!(kept_second.id, first.id);
    }

    #[tokio::test]
    async fn test_object_store_round_trip() {
        let store = MemoryStore::new();

        store
            .put("tank-images/u/a.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(store.fetch("tank-images/u/a.jpg").await.unwrap(), vec![1, 2, 3]);

        let url = store.signed_url("tank-images/u/a.jpg", 3600).await.unwrap();
        assert!(url.contains("expires_in=3600"));

        store.remove("tank-images/u/a.jpg").await.unwrap();
        // Removing again is fine; fetching is not
        store.remove("tank-images/u/a.jpg").await.unwrap();
        assert!(matches!(
            store.fetch("tank-images/u/a.jpg").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.signed_url("tank-images/u/a.jpg", 3600).await,
            Err(StoreError::NotFound)
        ));
    }
}
