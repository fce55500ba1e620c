//! Analysis invocation: live model calls or deterministic mocks.
//!
//! The mode is fixed at construction instead of re-read from the environment
//! per call; handlers receive an already-configured invoker and never look at
//! configuration themselves.

use rand::Rng;
use tracing::{debug, info};

use crate::interpret::InterpreterChain;
use crate::prompt;
use crate::types::{AnalysisReport, Breakdown};
use openai_client::{image_data_url, ChatRequest, Message, OpenAIClient, Result};

/// Model used for text (setup description) analyses.
pub const TEXT_MODEL: &str = "gpt-4o-mini";

/// Model used for vision (image) analyses.
pub const VISION_MODEL: &str = "gpt-4o";

/// Token ceiling on vision completions.
const VISION_MAX_TOKENS: u32 = 1000;

/// Canned long-form assessments for mock setup analyses.
const MOCK_ASSESSMENTS: [&str; 3] = [
    "Excellent reef setup with balanced livestock and proper equipment. Lighting supports coral \
     growth, filtration maintains quality water. Fish compatibility is strong. Consider calcium \
     reactor for long-term coral health. Bioload sustainable with expansion room. Well-planned \
     setup for healthy growth and behavior. Regular maintenance ensures success. Strong \
     foundation for reef keeping.",
    "Solid fundamentals with improvement potential. Fish selection diverse, avoiding aggression. \
     Lighting adequate for moderate corals - upgrade for SPS growth. Add flow pumps to eliminate \
     dead spots. Stable biological filtration processing waste well. Consider backup heating. \
     Match feeding to bioload. Excellent foundation for reef success and coral propagation.",
    "Thoughtful marine ecosystem design with balanced equipment. Livestock promotes natural \
     behaviors, minimizes stress. Healthy biological processes with effective nutrient export. \
     Lighting supports coral cycles. Consider refugium for natural processing. Regular testing \
     prevents parameter drift. Strong foundation for long-term success and gradual expansion.",
];

/// Whether analyses run against the live provider or a local simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Live,
    Mock,
}

/// Produces raw analyses, branching on the configured [`AnalysisMode`].
///
/// Interpretation of live output goes through [`InterpreterChain`]; mock
/// setup output is generated as a JSON string and pushed through the same
/// chain so both paths exercise identical parsing.
pub struct AnalysisInvoker {
    client: Option<OpenAIClient>,
    mode: AnalysisMode,
}

impl AnalysisInvoker {
    /// Build an invoker. Requesting live mode without a client falls back to
    /// mock mode, the same policy as running without an API key.
    pub fn new(mode: AnalysisMode, client: Option<OpenAIClient>) -> Self {
        let mode = if client.is_none() {
            AnalysisMode::Mock
        } else {
            mode
        };
        Self { client, mode }
    }

    /// Invoker that always simulates.
    pub fn mock() -> Self {
        Self::new(AnalysisMode::Mock, None)
    }

    /// Invoker that calls the live provider.
    pub fn live(client: OpenAIClient) -> Self {
        Self::new(AnalysisMode::Live, Some(client))
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Analyze a free-text tank description.
    pub async fn analyze_setup(&self, description: &str) -> Result<AnalysisReport> {
        let chain = InterpreterChain::text();

        match (self.mode, self.client.as_ref()) {
            (AnalysisMode::Live, Some(client)) => {
                debug!(model = TEXT_MODEL, "requesting setup analysis");
                let request = ChatRequest::new(TEXT_MODEL)
                    .message(Message::system(prompt::TEXT_SYSTEM_PROMPT))
                    .message(Message::user(prompt::text_user_prompt(description)));
                let response = client.chat_completion(request).await?;
                Ok(chain.interpret(&response.content))
            }
            _ => {
                info!("mock mode, simulating setup analysis");
                Ok(chain.interpret(&mock_setup_response()))
            }
        }
    }

    /// Analyze a tank photo, with optional free-text context.
    pub async fn analyze_image(
        &self,
        content_type: &str,
        image_bytes: &[u8],
        context: Option<&str>,
    ) -> Result<AnalysisReport> {
        match (self.mode, self.client.as_ref()) {
            (AnalysisMode::Live, Some(client)) => {
                debug!(
                    model = VISION_MODEL,
                    bytes = image_bytes.len(),
                    "requesting image analysis"
                );
                let data_url = image_data_url(content_type, image_bytes);
                let request = ChatRequest::new(VISION_MODEL)
                    .message(Message::user_with_image(prompt::vision_prompt(context), data_url))
                    .max_tokens(VISION_MAX_TOKENS);
                let response = client.chat_completion(request).await?;

                let mut report = InterpreterChain::vision().interpret(&response.content);
                report.image_analyzed = Some(true);
                report.cached = Some(false);
                Ok(report)
            }
            _ => {
                info!("mock mode, simulating image analysis");
                Ok(mock_image_report())
            }
        }
    }
}

/// Degraded report for a failed setup-analysis call. The request still
/// succeeds; the `error` field tells the client what happened.
pub fn fallback_setup_report() -> AnalysisReport {
    let score = rand::thread_rng().gen_range(50..80);
    let summary = "Analysis service temporarily unavailable. This is a fallback response.";

    AnalysisReport {
        score,
        general_assessment: None,
        breakdown: Breakdown {
            equipment: Some("Analysis temporarily unavailable. Basic setup detected.".into()),
            water_params: Some("Unable to analyze water parameters at this time.".into()),
            livestock: Some("Livestock compatibility check unavailable.".into()),
            recommendations: Some("Please try again later or contact support.".into()),
        },
        summary: summary.into(),
        result: summary.into(),
        image_analyzed: None,
        cached: None,
        error: Some("Analysis temporarily unavailable".into()),
    }
}

/// Mock setup analysis as a raw JSON string, scored uniformly in [60, 99].
fn mock_setup_response() -> String {
    let mut rng = rand::thread_rng();
    let score: i64 = rng.gen_range(60..100);
    let assessment = MOCK_ASSESSMENTS[rng.gen_range(0..MOCK_ASSESSMENTS.len())];

    serde_json::json!({
        "score": score,
        "generalAssessment": assessment,
        "breakdown": {
            "equipment": "Good filtration and lighting setup. Consider upgrading protein skimmer for better water quality.",
            "waterParams": "pH and salinity are within acceptable range. Monitor alkalinity and calcium levels regularly.",
            "livestock": "Current fish selection shows good compatibility. Avoid aggressive species in this setup.",
            "recommendations": "Add wave makers for better circulation. Consider gradual coral additions starting with hardy LPS species."
        }
    })
    .to_string()
}

/// Mock image analysis, scored uniformly in [60, 99].
fn mock_image_report() -> AnalysisReport {
    let score = rand::thread_rng().gen_range(60..100);

    AnalysisReport {
        score,
        general_assessment: Some(
            "This is a mock analysis of your tank image. Your setup shows good potential with \
             room for improvement in lighting and flow patterns."
                .into(),
        ),
        breakdown: Breakdown {
            equipment: Some(
                "Good basic equipment setup visible. Consider upgrading lighting for coral growth."
                    .into(),
            ),
            water_params: Some(
                "Water appears clear, suggesting good filtration. Monitor parameters regularly."
                    .into(),
            ),
            livestock: Some(
                "Fish appear healthy and active. Good variety without overcrowding.".into(),
            ),
            recommendations: Some(
                "Consider adding more live rock for biological filtration and coral placement \
                 areas."
                    .into(),
            ),
        },
        summary: "Mock analysis: Your reef tank shows promise with solid fundamentals.".into(),
        result: format!(
            "Overall score: {}/100 - Good foundation with improvement opportunities.",
            score
        ),
        image_analyzed: Some(true),
        cached: Some(false),
        error: None,
    }
}
