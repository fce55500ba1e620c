//! Canonical analysis types shared by every transport.
//!
//! One response schema replaces the per-endpoint variants that used to drift
//! apart: every analysis, whether of a typed-out description, a structured
//! setup, or an image, is expressed as an [`AnalysisReport`].

use serde::{Deserialize, Serialize};

/// A structured reef tank setup, as authored in the builder form.
///
/// Volume is stored in liters and temperature in celsius; display conversion
/// happens where the setup is rendered (see [`crate::prompt::describe`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankSetup {
    /// Tank volume in liters
    pub volume: f64,

    /// Lighting option id (e.g., "led-medium", "halide")
    pub lighting: String,

    /// Filtration option ids (e.g., "hob", "sump", "live-rock")
    #[serde(default)]
    pub filtration: Vec<String>,

    #[serde(default)]
    pub has_protein_skimmer: bool,

    #[serde(default)]
    pub has_heater: bool,

    #[serde(default)]
    pub has_wavemaker: bool,

    /// Fish stock, species ids unique within the list
    #[serde(default)]
    pub fish: Vec<LivestockEntry>,

    /// Coral stock, species ids unique within the list
    #[serde(default)]
    pub corals: Vec<LivestockEntry>,

    #[serde(default)]
    pub water_params: WaterParams,
}

/// One species/quantity pair in a setup's fish or coral list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockEntry {
    /// Species id (e.g., "ocellaris-clown", "hammer")
    pub species: String,
    pub quantity: u32,
}

/// Optional water chemistry readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterParams {
    pub ph: Option<f64>,

    /// Specific gravity (e.g., 1.025)
    pub salinity: Option<f64>,

    /// Temperature in celsius
    pub temperature: Option<f64>,
}

/// The canonical analysis response.
///
/// `score` is always present; everything else degrades gracefully. The
/// image-only flags (`image_analyzed`, `cached`) and the soft-failure `error`
/// field are omitted from the wire format when unset, so text analyses keep
/// the compact shape clients already expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Compatibility score, nominally 1-100
    pub score: i64,

    /// Long-form narrative assessment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_assessment: Option<String>,

    /// Four-part narrative breakdown; always an object, never null
    #[serde(default)]
    pub breakdown: Breakdown,

    /// Human-readable concatenation of the present breakdown fields
    #[serde(default)]
    pub summary: String,

    /// Display text, usually identical to `summary`
    #[serde(default)]
    pub result: String,

    /// Set when the assessment came from a vision call (or its mock)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analyzed: Option<bool>,

    /// Set on saved-image analyses: true when served from the result cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,

    /// Set when the report is a degraded stand-in for a failed model call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The four-part narrative assessment returned per analysis.
///
/// Fields are independently nullable; a missing field serializes as absent,
/// and an entirely empty breakdown serializes as `{}` rather than null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_params: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livestock: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl Breakdown {
    /// Pull the four known fields out of an untyped JSON value, dropping
    /// anything that is not a string. A missing or non-object value yields
    /// an empty breakdown.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        let get = |key: &str| {
            value
                .and_then(|v| v.get(key))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        Self {
            equipment: get("equipment"),
            water_params: get("waterParams"),
            livestock: get("livestock"),
            recommendations: get("recommendations"),
        }
    }

    /// Join the present, non-empty fields as labeled sections separated by
    /// blank lines. Returns `None` when nothing is present.
    pub fn labeled_summary(&self) -> Option<String> {
        let sections: Vec<String> = [
            ("Equipment", &self.equipment),
            ("Water Parameters", &self.water_params),
            ("Livestock", &self.livestock),
            ("Recommendations", &self.recommendations),
        ]
        .iter()
        .filter_map(|(label, field)| {
            field
                .as_deref()
                .filter(|text| !text.is_empty())
                .map(|text| format!("{}: {}", label, text))
        })
        .collect();

        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n\n"))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equipment.is_none()
            && self.water_params.is_none()
            && self.livestock.is_none()
            && self.recommendations.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_breakdown_serializes_as_object() {
        let report = AnalysisReport {
            score: 50,
            general_assessment: None,
            breakdown: Breakdown::default(),
            summary: "text".into(),
            result: "text".into(),
            image_analyzed: None,
            cached: None,
            error: None,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["breakdown"].is_object());
        assert_eq!(json["breakdown"], serde_json::json!({}));
        assert!(json.get("generalAssessment").is_none());
        assert!(json.get("imageAnalyzed").is_none());
        assert!(json.get("cached").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_breakdown_wire_names() {
        let breakdown = Breakdown {
            equipment: Some("eq".into()),
            water_params: Some("wp".into()),
            livestock: Some("ls".into()),
            recommendations: Some("rec".into()),
        };

        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["equipment"], "eq");
        assert_eq!(json["waterParams"], "wp");
        assert_eq!(json["livestock"], "ls");
        assert_eq!(json["recommendations"], "rec");
    }

    #[test]
    fn test_breakdown_from_value_drops_non_strings() {
        let value = serde_json::json!({
            "equipment": "lights",
            "waterParams": 42,
            "livestock": null,
            "extra": "ignored"
        });

        let breakdown = Breakdown::from_value(Some(&value));
        assert_eq!(breakdown.equipment.as_deref(), Some("lights"));
        assert!(breakdown.water_params.is_none());
        assert!(breakdown.livestock.is_none());
        assert!(breakdown.recommendations.is_none());
    }

    #[test]
    fn test_labeled_summary_joins_present_fields() {
        let breakdown = Breakdown {
            equipment: Some("Good skimmer.".into()),
            water_params: None,
            livestock: Some("".into()),
            recommendations: Some("Add flow.".into()),
        };

        let summary = breakdown.labeled_summary().unwrap();
        assert_eq!(summary, "Equipment: Good skimmer.\n\nRecommendations: Add flow.");
    }

    #[test]
    fn test_labeled_summary_empty() {
        assert!(Breakdown::default().labeled_summary().is_none());
    }

    #[test]
    fn test_tank_setup_wire_names() {
        let json = serde_json::json!({
            "volume": 283.9,
            "lighting": "led-medium",
            "filtration": ["hob"],
            "hasProteinSkimmer": false,
            "hasHeater": true,
            "hasWavemaker": false,
            "fish": [{ "species": "ocellaris-clown", "quantity": 2 }],
            "corals": [],
            "waterParams": { "ph": 8.2, "salinity": 1.025, "temperature": 25.6 }
        });

        let setup: TankSetup = serde_json::from_value(json).unwrap();
        assert_eq!(setup.volume, 283.9);
        assert!(setup.has_heater);
        assert!(!setup.has_protein_skimmer);
        assert_eq!(setup.fish[0].species, "ocellaris-clown");
        assert_eq!(setup.water_params.ph, Some(8.2));
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = AnalysisReport {
            score: 85,
            general_assessment: Some("Solid".into()),
            breakdown: Breakdown {
                equipment: Some("eq".into()),
                ..Default::default()
            },
            summary: "Equipment: eq".into(),
            result: "Equipment: eq".into(),
            image_analyzed: Some(true),
            cached: Some(false),
            error: None,
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
