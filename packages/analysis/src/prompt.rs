//! Prompt construction for setup and image analyses.
//!
//! The model is instructed to answer in a fixed JSON shape with per-field
//! character budgets; [`crate::interpret`] handles everything it sends back
//! anyway, conformant or not.

use crate::types::TankSetup;

/// 1 liter = 0.264172 US gallons.
pub const GALLONS_PER_LITER: f64 = 0.264172;

/// System prompt for text (setup description) analyses.
pub const TEXT_SYSTEM_PROMPT: &str = r#"You are an expert marine biologist and aquarium specialist.

IMPORTANT: You must respond with EXACTLY this JSON format:
{
  "score": [number between 1-100],
  "generalAssessment": "[concise overall assessment, max 560 characters]",
  "breakdown": {
    "equipment": "[equipment assessment, max 240 chars]",
    "waterParams": "[water parameters assessment, max 240 chars]",
    "livestock": "[fish/coral compatibility assessment, max 240 chars]",
    "recommendations": "[specific actionable recommendations, max 240 chars]"
  }
}

Scoring criteria (1-100):
- 90-100: Excellent setup, minimal improvements needed
- 80-89: Very good setup, minor tweaks recommended
- 70-79: Good setup, some improvements beneficial
- 60-69: Decent setup, several areas need attention
- 50-59: Basic setup, major improvements needed
- Below 50: Poor setup, significant changes required

The generalAssessment should be a concise overview of the tank setup in exactly 560 characters or less, discussing overall health, potential, challenges, and key recommendations. Each breakdown section must be under 240 characters for quick reference."#;

/// Format instructions appended to every vision prompt.
const VISION_FORMAT_INSTRUCTIONS: &str = r#"Provide a comprehensive analysis covering equipment, water quality, livestock, and recommendations.

Respond ONLY with valid JSON in this exact format:
{
  "score": 85,
  "generalAssessment": "Detailed overall assessment",
  "breakdown": {
    "equipment": "Equipment analysis",
    "waterParams": "Water quality assessment",
    "livestock": "Livestock analysis",
    "recommendations": "Specific recommendations"
  },
  "summary": "Brief summary",
  "result": "Final assessment",
  "imageAnalyzed": true,
  "cached": false
}

Provide meaningful analysis, not placeholder text."#;

/// User prompt wrapping a tank description for text analysis.
pub fn text_user_prompt(description: &str) -> String {
    format!(
        "Analyze this aquarium setup with detailed breakdown:\n\n{}",
        description
    )
}

/// Full prompt for a vision analysis, with optional user-supplied context.
pub fn vision_prompt(context: Option<&str>) -> String {
    let context = match context {
        Some(text) if !text.is_empty() => text,
        _ => "No additional context provided",
    };

    format!(
        "You are a reef aquarium expert. Analyze this reef tank image in detail. Context: {}\n\n{}",
        context, VISION_FORMAT_INSTRUCTIONS
    )
}

/// Flatten a structured setup into the one-line description the model sees.
///
/// Volume and temperature are stored metric but rendered imperial, matching
/// how hobbyists talk about tanks ("75-gallon", "78°F"). Sections with no
/// content are omitted entirely.
pub fn describe(setup: &TankSetup) -> String {
    let gallons = (setup.volume * GALLONS_PER_LITER).round() as i64;
    let mut description = format!(
        "{}-gallon saltwater reef tank with {} lighting",
        gallons, setup.lighting
    );

    if !setup.filtration.is_empty() {
        description.push_str(&format!(", {} filtration", setup.filtration.join(" and ")));
    }

    let mut equipment = Vec::new();
    if setup.has_protein_skimmer {
        equipment.push("protein skimmer");
    }
    if setup.has_heater {
        equipment.push("heater");
    }
    if setup.has_wavemaker {
        equipment.push("wavemaker");
    }
    if !equipment.is_empty() {
        description.push_str(&format!(", equipped with {}", equipment.join(", ")));
    }

    if !setup.fish.is_empty() {
        let fish_list = setup
            .fish
            .iter()
            .map(|f| format!("{}x {}", f.quantity, f.species))
            .collect::<Vec<_>>()
            .join(", ");
        description.push_str(&format!(". Fish: {}", fish_list));
    }

    if !setup.corals.is_empty() {
        let coral_list = setup
            .corals
            .iter()
            .map(|c| format!("{}x {}", c.quantity, c.species))
            .collect::<Vec<_>>()
            .join(", ");
        description.push_str(&format!(". Corals: {}", coral_list));
    }

    let mut water = Vec::new();
    if let Some(ph) = setup.water_params.ph {
        water.push(format!("pH {}", ph));
    }
    if let Some(salinity) = setup.water_params.salinity {
        water.push(format!("salinity {}", salinity));
    }
    if let Some(celsius) = setup.water_params.temperature {
        let fahrenheit = (celsius * 9.0 / 5.0 + 32.0).round() as i64;
        water.push(format!("temperature {}°F", fahrenheit));
    }
    if !water.is_empty() {
        description.push_str(&format!(". Water parameters: {}", water.join(", ")));
    }

    description
}
