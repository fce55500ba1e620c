use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use analysis::{Breakdown, LivestockEntry, TankSetup, WaterParams};

/// Tank setup row - the flattened form of a builder submission
///
/// Water parameters are nullable; livestock lives in junction rows keyed by
/// the setup id.
#[derive(Debug, Clone)]
pub struct SetupRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub volume: f64,
    pub lighting: String,
    pub filtration: Vec<String>,
    pub has_protein_skimmer: bool,
    pub has_heater: bool,
    pub has_wavemaker: bool,
    pub water_ph: Option<f64>,
    pub water_salinity: Option<f64>,
    pub water_temperature: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SetupRow {
    /// Build a fresh row from the submitted form shape
    pub fn new(user_id: Uuid, name: String, setup: &TankSetup) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            volume: setup.volume,
            lighting: setup.lighting.clone(),
            filtration: setup.filtration.clone(),
            has_protein_skimmer: setup.has_protein_skimmer,
            has_heater: setup.has_heater,
            has_wavemaker: setup.has_wavemaker,
            water_ph: setup.water_params.ph,
            water_salinity: setup.water_params.salinity,
            water_temperature: setup.water_params.temperature,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Junction row linking a setup to a species and count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LivestockRow {
    pub species_id: String,
    pub quantity: u32,
}

impl From<&LivestockEntry> for LivestockRow {
    fn from(entry: &LivestockEntry) -> Self {
        Self {
            species_id: entry.species.clone(),
            quantity: entry.quantity,
        }
    }
}

/// Persisted analysis attached to a setup. Never mutated; newer rows
/// supersede older ones.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub tank_setup_id: Uuid,
    pub score: i64,
    pub summary: Option<String>,
    pub general_assessment: Option<String>,
    pub breakdown: Option<Breakdown>,
    pub created_at: DateTime<Utc>,
}

/// Analysis payload a client attaches to a save or update request.
///
/// `summary` falls back to the legacy `result` field when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub score: i64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub general_assessment: Option<String>,
    #[serde(default)]
    pub breakdown: Option<Breakdown>,
}

impl AnalysisInput {
    pub fn into_record(self, tank_setup_id: Uuid) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            tank_setup_id,
            score: self.score,
            summary: self.summary.or(self.result),
            general_assessment: self.general_assessment,
            breakdown: self.breakdown,
            created_at: Utc::now(),
        }
    }
}

/// Latest analysis inlined into a saved setup response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
}

impl From<AnalysisRecord> for AnalysisSummary {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            score: record.score,
            summary: record.summary,
            breakdown: record.breakdown,
        }
    }
}

/// Complete saved setup as returned to clients (snake_case wire format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTankSetup {
    pub id: Uuid,
    pub name: String,
    pub volume: f64,
    pub lighting: String,
    pub filtration: Vec<String>,
    pub has_protein_skimmer: bool,
    pub has_heater: bool,
    pub has_wavemaker: bool,
    pub water_ph: Option<f64>,
    pub water_salinity: Option<f64>,
    pub water_temperature: Option<f64>,
    pub fish: Vec<LivestockRow>,
    pub corals: Vec<LivestockRow>,
    pub analysis_result: Option<AnalysisSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedTankSetup {
    pub fn assemble(
        row: SetupRow,
        fish: Vec<LivestockRow>,
        corals: Vec<LivestockRow>,
        analysis: Option<AnalysisRecord>,
    ) -> Self {
        Self {
            id: row.id,
            name: row.name,
            volume: row.volume,
            lighting: row.lighting,
            filtration: row.filtration,
            has_protein_skimmer: row.has_protein_skimmer,
            has_heater: row.has_heater,
            has_wavemaker: row.has_wavemaker,
            water_ph: row.water_ph,
            water_salinity: row.water_salinity,
            water_temperature: row.water_temperature,
            fish,
            corals,
            analysis_result: analysis.map(AnalysisSummary::from),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    /// Inverse of the save mapping: reconstruct the builder form shape
    pub fn to_setup(&self) -> TankSetup {
        TankSetup {
            volume: self.volume,
            lighting: self.lighting.clone(),
            filtration: self.filtration.clone(),
            has_protein_skimmer: self.has_protein_skimmer,
            has_heater: self.has_heater,
            has_wavemaker: self.has_wavemaker,
            fish: self
                .fish
                .iter()
                .map(|f| LivestockEntry {
                    species: f.species_id.clone(),
                    quantity: f.quantity,
                })
                .collect(),
            corals: self
                .corals
                .iter()
                .map(|c| LivestockEntry {
                    species: c.species_id.clone(),
                    quantity: c.quantity,
                })
                .collect(),
            water_params: WaterParams {
                ph: self.water_ph,
                salinity: self.water_salinity,
                temperature: self.water_temperature,
            },
        }
    }
}

/// Analysis history entry joined with its setup row
#[derive(Debug, Clone, Serialize)]
pub struct TankAnalysisEntry {
    pub id: Uuid,
    pub tank_setup_name: String,
    pub setup_volume: f64,
    pub score: i64,
    pub summary: Option<String>,
    pub general_assessment: Option<String>,
    pub breakdown: Option<Breakdown>,
    pub created_at: DateTime<Utc>,
}

impl TankAnalysisEntry {
    pub fn from_parts(record: AnalysisRecord, setup: &SetupRow) -> Self {
        Self {
            id: record.id,
            tank_setup_name: setup.name.clone(),
            setup_volume: setup.volume,
            score: record.score,
            summary: record.summary,
            general_assessment: record.general_assessment,
            breakdown: record.breakdown,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_setup() -> TankSetup {
        TankSetup {
            volume: 283.9,
            lighting: "led-high".to_string(),
            filtration: vec!["sump".to_string(), "protein-skimmer".to_string()],
            has_protein_skimmer: true,
            has_heater: true,
            has_wavemaker: false,
            fish: vec![LivestockEntry {
                species: "ocellaris-clownfish".to_string(),
                quantity: 2,
            }],
            corals: vec![LivestockEntry {
                species: "hammer-coral".to_string(),
                quantity: 1,
            }],
            water_params: WaterParams {
                ph: Some(8.2),
                salinity: Some(1.025),
                temperature: Some(25.6),
            },
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let setup = sample_setup();
        let row = SetupRow::new(Uuid::new_v4(), "Display tank".to_string(), &setup);
        let fish: Vec<LivestockRow> = setup.fish.iter().map(LivestockRow::from).collect();
        let corals: Vec<LivestockRow> = setup.corals.iter().map(LivestockRow::from).collect();

        let saved = SavedTankSetup::assemble(row, fish, corals, None);
        let restored = saved.to_setup();

        assert_eq!(restored.volume, setup.volume);
        assert_eq!(restored.lighting, setup.lighting);
        assert_eq!(restored.filtration, setup.filtration);
        assert_eq!(restored.has_protein_skimmer, setup.has_protein_skimmer);
        assert_eq!(restored.has_heater, setup.has_heater);
        assert_eq!(restored.has_wavemaker, setup.has_wavemaker);
        assert_eq!(restored.fish, setup.fish);
        assert_eq!(restored.corals, setup.corals);
        assert_eq!(restored.water_params.ph, setup.water_params.ph);
        assert_eq!(restored.water_params.salinity, setup.water_params.salinity);
        assert_eq!(
            restored.water_params.temperature,
            setup.water_params.temperature
        );
    }

    #[test]
    fn test_analysis_input_summary_falls_back_to_result() {
        let input = AnalysisInput {
            score: 82,
            summary: None,
            result: Some("Legacy result text".to_string()),
            general_assessment: None,
            breakdown: None,
        };
        let record = input.into_record(Uuid::new_v4());
        assert_eq!(record.summary.as_deref(), Some("Legacy result text"));
    }

    #[test]
    fn test_analysis_input_prefers_summary() {
        let input = AnalysisInput {
            score: 82,
            summary: Some("Summary text".to_string()),
            result: Some("Legacy result text".to_string()),
            general_assessment: None,
            breakdown: None,
        };
        let record = input.into_record(Uuid::new_v4());
        assert_eq!(record.summary.as_deref(), Some("Summary text"));
    }

    #[test]
    fn test_saved_setup_serializes_snake_case() {
        let setup = sample_setup();
        let row = SetupRow::new(Uuid::new_v4(), "Display tank".to_string(), &setup);
        let saved = SavedTankSetup::assemble(row, Vec::new(), Vec::new(), None);

        let value = serde_json::to_value(&saved).unwrap();
        assert!(value.get("has_protein_skimmer").is_some());
        assert!(value.get("water_ph").is_some());
        assert!(value["analysis_result"].is_null());
    }
}
