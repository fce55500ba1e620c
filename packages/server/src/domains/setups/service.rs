//! Tank setup persistence.
//!
//! Saves are multi-step (setup row, fish rows, coral rows, optional analysis)
//! and the store has no transactions, so this service owns the compensating
//! actions: a failed livestock insert on save removes the setup row again.
//! Analysis attachment is non-fatal on both save and update.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use analysis::TankSetup;

use crate::kernel::{BaseSetupStore, StoreError};

use super::models::{
    AnalysisInput, LivestockRow, SavedTankSetup, SetupRow, TankAnalysisEntry,
};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Tank setup not found")]
    NotFound,
    #[error("Failed to {action}: {source}")]
    Livestock {
        action: &'static str,
        source: StoreError,
    },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SetupError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => SetupError::NotFound,
            other => SetupError::Store(other),
        }
    }
}

pub struct SetupService {
    store: Arc<dyn BaseSetupStore>,
}

impl SetupService {
    pub fn new(store: Arc<dyn BaseSetupStore>) -> Self {
        Self { store }
    }

    /// Save a new setup with its livestock and optional analysis result
    pub async fn save(
        &self,
        user_id: Uuid,
        name: String,
        setup: TankSetup,
        analysis: Option<AnalysisInput>,
    ) -> Result<SavedTankSetup, SetupError> {
        let row = self
            .store
            .insert_setup(SetupRow::new(user_id, name, &setup))
            .await?;
        debug!(setup_id = %row.id, user_id = %user_id, "inserted tank setup");

        let fish: Vec<LivestockRow> = setup.fish.iter().map(LivestockRow::from).collect();
        if !fish.is_empty() {
            if let Err(e) = self.store.insert_fish(row.id, &fish).await {
                self.remove_partial_save(row.id, user_id).await;
                return Err(SetupError::Livestock {
                    action: "save fish",
                    source: e,
                });
            }
        }

        let corals: Vec<LivestockRow> = setup.corals.iter().map(LivestockRow::from).collect();
        if !corals.is_empty() {
            if let Err(e) = self.store.insert_corals(row.id, &corals).await {
                self.remove_partial_save(row.id, user_id).await;
                return Err(SetupError::Livestock {
                    action: "save corals",
                    source: e,
                });
            }
        }

        self.attach_analysis(row.id, analysis).await;
        self.load(user_id, row.id).await
    }

    /// Update an existing setup in place, replacing its livestock
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        name: String,
        setup: TankSetup,
        analysis: Option<AnalysisInput>,
    ) -> Result<SavedTankSetup, SetupError> {
        let existing = self.store.get_setup(id, user_id).await?;

        let mut row = SetupRow::new(user_id, name, &setup);
        row.id = id;
        row.created_at = existing.created_at;
        self.store.update_setup(row).await?;

        self.store.clear_livestock(id).await?;
        let fish: Vec<LivestockRow> = setup.fish.iter().map(LivestockRow::from).collect();
        if !fish.is_empty() {
            self.store
                .insert_fish(id, &fish)
                .await
                .map_err(|e| SetupError::Livestock {
                    action: "update fish",
                    source: e,
                })?;
        }
        let corals: Vec<LivestockRow> = setup.corals.iter().map(LivestockRow::from).collect();
        if !corals.is_empty() {
            self.store
                .insert_corals(id, &corals)
                .await
                .map_err(|e| SetupError::Livestock {
                    action: "update corals",
                    source: e,
                })?;
        }

        self.attach_analysis(id, analysis).await;
        self.load(user_id, id).await
    }

    /// Load one setup with livestock and its latest analysis
    pub async fn load(&self, user_id: Uuid, id: Uuid) -> Result<SavedTankSetup, SetupError> {
        let row = self.store.get_setup(id, user_id).await?;
        self.assemble(row).await
    }

    /// All of a user's setups, newest first
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<SavedTankSetup>, SetupError> {
        let rows = self.store.list_setups(user_id).await?;
        let mut setups = Vec::with_capacity(rows.len());
        for row in rows {
            setups.push(self.assemble(row).await?);
        }
        Ok(setups)
    }

    /// Delete is idempotent: removing an id that is already gone succeeds
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), SetupError> {
        match self.store.delete_setup(id, user_id).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(SetupError::Store(e)),
        }
    }

    /// A user's setup analyses joined with setup names, newest first
    pub async fn analysis_history(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<TankAnalysisEntry>, SetupError> {
        let rows = self.store.list_analyses(user_id, limit).await?;
        Ok(rows
            .into_iter()
            .map(|(record, setup)| TankAnalysisEntry::from_parts(record, &setup))
            .collect())
    }

    async fn assemble(&self, row: SetupRow) -> Result<SavedTankSetup, SetupError> {
        let fish = self.store.fish_for(row.id).await?;
        let corals = self.store.corals_for(row.id).await?;
        let analysis = self.store.latest_analysis(row.id).await?;
        Ok(SavedTankSetup::assemble(row, fish, corals, analysis))
    }

    // Clean up the setup row when a livestock insert fails mid-save
    async fn remove_partial_save(&self, id: Uuid, user_id: Uuid) {
        if let Err(e) = self.store.delete_setup(id, user_id).await {
            warn!(error = %e, setup_id = %id, "failed to remove partial setup");
        }
    }

    // Analysis attachment never fails the surrounding save or update
    async fn attach_analysis(&self, setup_id: Uuid, analysis: Option<AnalysisInput>) {
        let Some(input) = analysis else { return };
        if let Err(e) = self.store.insert_analysis(input.into_record(setup_id)).await {
            warn!(error = %e, setup_id = %setup_id, "failed to save analysis result");
        }
    }
}
