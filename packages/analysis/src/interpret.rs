//! Defensive interpretation of raw model output.
//!
//! Model responses are supposed to be strict JSON but frequently are not:
//! markdown fences, prose preambles, or plain refusals all show up in
//! practice. Interpretation is therefore a chain of strategies tried in
//! order, each either producing a report or declining. The final strategy
//! accepts anything, so a request never fails because the model rambled.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::types::{AnalysisReport, Breakdown};
use openai_client::strip_code_blocks;

/// Shown when a setup analysis parses but carries no narrative.
const DEFAULT_ASSESSMENT: &str = "Assessment not available. Please try again.";

/// Shown when a setup analysis parses but the breakdown is empty.
const NO_BREAKDOWN_SUMMARY: &str = "Unable to analyze setup properly.";

/// Shown when even the raw text is empty.
const EMPTY_RAW_FALLBACK: &str = "Analysis unavailable.";

/// Character cap on raw text passed through as a degraded summary.
const RAW_TEXT_LIMIT: usize = 960;

lazy_static! {
    // "score: 85", "Score 85", "score:85"
    static ref SCORE_REGEX: Regex = Regex::new(r"(?i)score[:\s]*(\d+)").unwrap();

    // First sentence mentioning each topic
    static ref EQUIPMENT_REGEX: Regex = Regex::new(r"(?i)equipment[^.]*\.").unwrap();
    static ref WATER_REGEX: Regex = Regex::new(r"(?i)water[^.]*\.").unwrap();
    static ref LIVESTOCK_REGEX: Regex = Regex::new(r"(?i)(fish|coral|livestock)[^.]*\.").unwrap();
    static ref RECOMMEND_REGEX: Regex = Regex::new(r"(?i)recommend[^.]*\.").unwrap();
}

/// One strategy for turning raw model output into a structured report.
///
/// Returning `None` declines the input and passes it to the next strategy in
/// the chain.
pub trait ResponseInterpreter: Send + Sync {
    fn interpret(&self, raw: &str) -> Option<AnalysisReport>;
}

/// Ordered list of interpreters, tried until one produces a report.
pub struct InterpreterChain {
    interpreters: Vec<Box<dyn ResponseInterpreter>>,
}

impl InterpreterChain {
    pub fn new(interpreters: Vec<Box<dyn ResponseInterpreter>>) -> Self {
        Self { interpreters }
    }

    /// Chain for setup (text) analyses: strict JSON, then raw passthrough.
    pub fn text() -> Self {
        Self::new(vec![
            Box::new(JsonInterpreter),
            Box::new(RawTextInterpreter),
        ])
    }

    /// Chain for image (vision) analyses: full-report JSON, then keyword
    /// extraction from prose, then raw passthrough.
    pub fn vision() -> Self {
        Self::new(vec![
            Box::new(JsonReportInterpreter),
            Box::new(RegexInterpreter),
            Box::new(RawTextInterpreter),
        ])
    }

    /// Run the chain. Always yields a report: if every configured
    /// interpreter declines, the raw text itself becomes the report.
    pub fn interpret(&self, raw: &str) -> AnalysisReport {
        for (position, interpreter) in self.interpreters.iter().enumerate() {
            if let Some(report) = interpreter.interpret(raw) {
                if position > 0 {
                    warn!(
                        interpreter = position,
                        "model output was not clean JSON, degraded interpretation used"
                    );
                }
                return report;
            }
        }
        raw_report(raw)
    }
}

/// Strict-JSON interpreter for setup analyses.
///
/// Accepts any parseable JSON document (markdown fences stripped first) and
/// rebuilds the report from its `score`, `generalAssessment`, and
/// `breakdown` fields, synthesizing the summary from the breakdown. Empty
/// input counts as an empty document rather than a parse failure.
pub struct JsonInterpreter;

impl ResponseInterpreter for JsonInterpreter {
    fn interpret(&self, raw: &str) -> Option<AnalysisReport> {
        let cleaned = strip_code_blocks(raw);
        let payload = if cleaned.is_empty() { "{}" } else { cleaned };
        let parsed: Value = serde_json::from_str(payload).ok()?;

        let score = parsed
            .get("score")
            .and_then(numeric_score)
            .filter(|s| *s != 0)
            .unwrap_or(50);

        let breakdown = Breakdown::from_value(parsed.get("breakdown"));

        let general_assessment = parsed
            .get("generalAssessment")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ASSESSMENT)
            .to_string();

        let summary = breakdown
            .labeled_summary()
            .unwrap_or_else(|| NO_BREAKDOWN_SUMMARY.to_string());

        Some(AnalysisReport {
            score,
            general_assessment: Some(general_assessment),
            breakdown,
            summary: summary.clone(),
            result: summary,
            image_analyzed: None,
            cached: None,
            error: None,
        })
    }
}

/// Whole-report JSON interpreter for vision analyses.
///
/// The vision prompt asks the model to emit the complete report shape, so a
/// conformant answer deserializes directly. Declines on anything that does
/// not parse as a report with a numeric score.
pub struct JsonReportInterpreter;

impl ResponseInterpreter for JsonReportInterpreter {
    fn interpret(&self, raw: &str) -> Option<AnalysisReport> {
        serde_json::from_str(strip_code_blocks(raw)).ok()
    }
}

/// Keyword extraction from prose.
///
/// When the model answers in sentences instead of JSON, pull a score and one
/// sentence per topic out of the text. Declines when the text carries no
/// recognizable signal at all.
pub struct RegexInterpreter;

impl ResponseInterpreter for RegexInterpreter {
    fn interpret(&self, raw: &str) -> Option<AnalysisReport> {
        let score_capture = SCORE_REGEX
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok());

        let mentions_equipment = raw.contains("equipment");
        let mentions_water = raw.contains("water");
        let mentions_livestock =
            raw.contains("fish") || raw.contains("coral") || raw.contains("livestock");
        let mentions_recommendations = raw.contains("recommend");

        if score_capture.is_none()
            && !mentions_equipment
            && !mentions_water
            && !mentions_livestock
            && !mentions_recommendations
        {
            return None;
        }

        let equipment = if mentions_equipment {
            first_match(&EQUIPMENT_REGEX, raw)
                .unwrap_or_else(|| "Equipment assessment included in general analysis.".to_string())
        } else {
            "No specific equipment analysis available.".to_string()
        };

        let water_params = if mentions_water {
            first_match(&WATER_REGEX, raw).unwrap_or_else(|| {
                "Water quality assessment included in general analysis.".to_string()
            })
        } else {
            "No specific water parameter analysis available.".to_string()
        };

        let livestock = if mentions_livestock {
            first_match(&LIVESTOCK_REGEX, raw)
                .unwrap_or_else(|| "Livestock assessment included in general analysis.".to_string())
        } else {
            "No specific livestock analysis available.".to_string()
        };

        let recommendations = if mentions_recommendations {
            first_match(&RECOMMEND_REGEX, raw)
                .unwrap_or_else(|| "Recommendations included in general analysis.".to_string())
        } else {
            "See general assessment for recommendations.".to_string()
        };

        Some(AnalysisReport {
            score: score_capture.unwrap_or(75),
            general_assessment: Some(snippet(raw, 300)),
            breakdown: Breakdown {
                equipment: Some(equipment),
                water_params: Some(water_params),
                livestock: Some(livestock),
                recommendations: Some(recommendations),
            },
            summary: snippet(raw, 150),
            result: raw.to_string(),
            image_analyzed: None,
            cached: None,
            error: None,
        })
    }
}

/// Last resort: the raw text, truncated, becomes the report. Never declines.
pub struct RawTextInterpreter;

impl ResponseInterpreter for RawTextInterpreter {
    fn interpret(&self, raw: &str) -> Option<AnalysisReport> {
        Some(raw_report(raw))
    }
}

/// Degraded report carrying the truncated raw text: score 50, empty
/// breakdown, readable but unstructured body.
fn raw_report(raw: &str) -> AnalysisReport {
    let truncated = truncate_chars(raw, RAW_TEXT_LIMIT);
    let body = if truncated.is_empty() {
        EMPTY_RAW_FALLBACK
    } else {
        truncated
    };

    AnalysisReport {
        score: 50,
        general_assessment: None,
        breakdown: Breakdown::default(),
        summary: body.to_string(),
        result: body.to_string(),
        image_analyzed: None,
        cached: None,
        error: None,
    }
}

fn numeric_score(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn first_match(regex: &Regex, text: &str) -> Option<String> {
    regex.find(text).map(|m| m.as_str().to_string())
}

/// Truncate to at most `max_chars` characters (not bytes).
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncated preview with a trailing "..." when the text was cut.
fn snippet(text: &str, max_chars: usize) -> String {
    let truncated = truncate_chars(text, max_chars);
    if truncated.len() < text.len() {
        format!("{}...", truncated)
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chain_parses_full_json() {
        let raw = serde_json::json!({
            "score": 85,
            "generalAssessment": "Well balanced system.",
            "breakdown": {
                "equipment": "Strong skimmer.",
                "waterParams": "Stable pH.",
                "livestock": "Peaceful mix.",
                "recommendations": "Add flow."
            }
        })
        .to_string();

        let report = InterpreterChain::text().interpret(&raw);
        assert_eq!(report.score, 85);
        assert_eq!(report.general_assessment.as_deref(), Some("Well balanced system."));
        assert_eq!(report.breakdown.equipment.as_deref(), Some("Strong skimmer."));
        assert_eq!(
            report.summary,
            "Equipment: Strong skimmer.\n\nWater Parameters: Stable pH.\n\n\
             Livestock: Peaceful mix.\n\nRecommendations: Add flow."
        );
        assert_eq!(report.result, report.summary);
        assert!(report.image_analyzed.is_none());
    }

    #[test]
    fn test_text_chain_defaults_missing_score() {
        let report = InterpreterChain::text().interpret(r#"{"breakdown":{"equipment":"ok."}}"#);
        assert_eq!(report.score, 50);

        let zero = InterpreterChain::text().interpret(r#"{"score":0,"breakdown":{}}"#);
        assert_eq!(zero.score, 50);
    }

    #[test]
    fn test_text_chain_defaults_missing_assessment() {
        let report = InterpreterChain::text().interpret(r#"{"score":70,"breakdown":{}}"#);
        assert_eq!(
            report.general_assessment.as_deref(),
            Some("Assessment not available. Please try again.")
        );
    }

    #[test]
    fn test_text_chain_empty_breakdown_summary() {
        let report = InterpreterChain::text().interpret(r#"{"score":70}"#);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.summary, "Unable to analyze setup properly.");
    }

    #[test]
    fn test_text_chain_strips_markdown_fences() {
        let raw = "```json\n{\"score\":90,\"breakdown\":{\"equipment\":\"LED.\"}}\n```";
        let report = InterpreterChain::text().interpret(raw);
        assert_eq!(report.score, 90);
        assert_eq!(report.breakdown.equipment.as_deref(), Some("LED."));
    }

    #[test]
    fn test_text_chain_empty_input_is_empty_document() {
        let report = InterpreterChain::text().interpret("");
        assert_eq!(report.score, 50);
        assert_eq!(report.summary, "Unable to analyze setup properly.");
    }

    #[test]
    fn test_text_chain_degrades_to_raw_text() {
        let raw = "The model refused to answer in JSON today.";
        let report = InterpreterChain::text().interpret(raw);
        assert_eq!(report.score, 50);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.summary, raw);
        assert_eq!(report.result, raw);
        assert!(report.general_assessment.is_none());
    }

    #[test]
    fn test_raw_text_truncated_to_limit() {
        let raw = "x".repeat(2000);
        let report = InterpreterChain::text().interpret(&raw);
        assert_eq!(report.score, 50);
        assert_eq!(report.summary.chars().count(), 960);
        assert_eq!(report.summary, raw[..960]);
    }

    #[test]
    fn test_raw_text_truncation_respects_char_boundaries() {
        let raw = "海".repeat(1200);
        let report = InterpreterChain::text().interpret(&raw);
        assert_eq!(report.summary.chars().count(), 960);
    }

    #[test]
    fn test_vision_chain_accepts_full_report() {
        let raw = serde_json::json!({
            "score": 88,
            "generalAssessment": "Healthy display tank.",
            "breakdown": {
                "equipment": "Visible skimmer.",
                "waterParams": "Clear water.",
                "livestock": "Active fish.",
                "recommendations": "More rock."
            },
            "summary": "Looks good.",
            "result": "Final: good.",
            "imageAnalyzed": true,
            "cached": false
        })
        .to_string();

        let report = InterpreterChain::vision().interpret(&raw);
        assert_eq!(report.score, 88);
        assert_eq!(report.summary, "Looks good.");
        assert_eq!(report.result, "Final: good.");
        assert_eq!(report.image_analyzed, Some(true));
    }

    #[test]
    fn test_vision_chain_extracts_fields_from_prose() {
        let raw = "Overall score: 82. The equipment looks modern and well maintained. \
                   The water appears crystal clear. Your fish seem active and healthy. \
                   I recommend adding a refugium.";

        let report = InterpreterChain::vision().interpret(raw);
        assert_eq!(report.score, 82);
        assert_eq!(
            report.breakdown.equipment.as_deref(),
            Some("equipment looks modern and well maintained.")
        );
        assert_eq!(
            report.breakdown.water_params.as_deref(),
            Some("water appears crystal clear.")
        );
        assert_eq!(
            report.breakdown.livestock.as_deref(),
            Some("fish seem active and healthy.")
        );
        assert_eq!(
            report.breakdown.recommendations.as_deref(),
            Some("recommend adding a refugium.")
        );
        assert_eq!(report.result, raw);
    }

    #[test]
    fn test_vision_prose_defaults_when_topics_absent() {
        let raw = "score: 70. A pleasant aquascape overall with water in view.";
        let report = InterpreterChain::vision().interpret(raw);

        assert_eq!(report.score, 70);
        assert_eq!(
            report.breakdown.equipment.as_deref(),
            Some("No specific equipment analysis available.")
        );
        assert_eq!(
            report.breakdown.livestock.as_deref(),
            Some("No specific livestock analysis available.")
        );
        assert_eq!(
            report.breakdown.recommendations.as_deref(),
            Some("See general assessment for recommendations.")
        );
        assert_eq!(
            report.breakdown.water_params.as_deref(),
            Some("water in view.")
        );
    }

    #[test]
    fn test_vision_prose_default_score() {
        let raw = "Nice equipment throughout the display.";
        let report = InterpreterChain::vision().interpret(raw);
        assert_eq!(report.score, 75);
    }

    #[test]
    fn test_vision_prose_truncates_assessment_and_summary() {
        let filler = "a".repeat(400);
        let raw = format!("score: 65. equipment everywhere. {}", filler);
        let report = InterpreterChain::vision().interpret(&raw);

        let assessment = report.general_assessment.unwrap();
        assert!(assessment.ends_with("..."));
        assert_eq!(assessment.chars().count(), 303);
        assert!(report.summary.ends_with("..."));
        assert_eq!(report.summary.chars().count(), 153);
        assert_eq!(report.result, raw);
    }

    #[test]
    fn test_vision_chain_garbage_hits_raw_text() {
        let raw = "%%%% ???? !!!!";
        let report = InterpreterChain::vision().interpret(raw);
        assert_eq!(report.score, 50);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.summary, raw);
    }

    #[test]
    fn test_vision_empty_input_yields_placeholder() {
        let report = InterpreterChain::vision().interpret("");
        assert_eq!(report.score, 50);
        assert_eq!(report.summary, "Analysis unavailable.");
    }

    #[test]
    fn test_custom_chain_order() {
        let chain = InterpreterChain::new(vec![Box::new(RawTextInterpreter)]);
        let report = chain.interpret(r#"{"score": 99}"#);
        assert_eq!(report.score, 50);
        assert_eq!(report.summary, r#"{"score": 99}"#);
    }

    #[test]
    fn test_snippet_short_text_untouched() {
        assert_eq!(snippet("short", 150), "short");
    }
}
