//! Tank setups domain - saved reef configurations and their analyses
//!
//! Responsibilities:
//! - Multi-step setup persistence with livestock junction rows
//! - Compensating cleanup when a save fails partway through
//! - Analysis history for saved setups

pub mod models;
pub mod service;

pub use models::{
    AnalysisInput, AnalysisRecord, AnalysisSummary, LivestockRow, SavedTankSetup, SetupRow,
    TankAnalysisEntry,
};
pub use service::{SetupError, SetupService};
