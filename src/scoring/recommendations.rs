//! Recommendation generator
//!
//! Each risk tier has a base set of three advisories. Missing sensation and
//! elevated glucose each add one more, so a result carries 3 to 5 entries.

use crate::scoring::classifier::RiskLevel;
use std::collections::BTreeMap;

/// Key of the single advisory in the safe default assessment
pub const ERROR_KEY: &str = "Error";

const ERROR_ADVICE: &str = "An error occurred during risk assessment. Please try again later.";

const SENSORY_PROTECTION: (&str, &str) = (
    "Sensory Protection",
    "Take extra precautions with hot surfaces and sharp objects. Wear protective footwear.",
);

const GLUCOSE_CONTROL: (&str, &str) = (
    "Glucose Control",
    "Your glucose levels are elevated. Consider dietary adjustments and consult your healthcare provider.",
);

/// Glucose above which the glucose control advisory is added
const ELEVATED_GLUCOSE: f32 = 140.0;

fn base_advice(level: RiskLevel) -> [(&'static str, &'static str); 3] {
    match level {
        RiskLevel::High => [
            (
                "Medical Consultation",
                "Schedule an appointment with your healthcare provider as soon as possible.",
            ),
            (
                "Glucose Management",
                "Monitor your blood glucose levels more frequently and maintain tight control.",
            ),
            (
                "Foot Care",
                "Inspect your feet daily for cuts, blisters, or sores.",
            ),
        ],
        RiskLevel::Moderate => [
            (
                "Medical Follow-up",
                "Discuss these results with your healthcare provider at your next appointment.",
            ),
            (
                "Glucose Management",
                "Continue monitoring your blood glucose levels regularly.",
            ),
            (
                "Lifestyle",
                "Consider increasing physical activity to improve circulation.",
            ),
        ],
        RiskLevel::Low => [
            (
                "Preventive Care",
                "Continue your current diabetes management plan.",
            ),
            (
                "Monitoring",
                "Regular check-ups with your healthcare provider are recommended.",
            ),
            (
                "Lifestyle",
                "Maintain a healthy diet and regular exercise routine.",
            ),
        ],
    }
}

/// Build the advisory map for a classified result
pub fn recommend(
    level: RiskLevel,
    glucose: f32,
    has_temperature: bool,
    has_pressure: bool,
) -> BTreeMap<String, String> {
    let mut advice: BTreeMap<String, String> = base_advice(level)
        .iter()
        .map(|(title, text)| (title.to_string(), text.to_string()))
        .collect();

    if !has_temperature || !has_pressure {
        let (title, text) = SENSORY_PROTECTION;
        advice.insert(title.to_string(), text.to_string());
    }

    if glucose > ELEVATED_GLUCOSE {
        let (title, text) = GLUCOSE_CONTROL;
        advice.insert(title.to_string(), text.to_string());
    }

    advice
}

/// Advisory returned when an assessment could not be completed
pub fn safe_default_recommendations() -> BTreeMap<String, String> {
    BTreeMap::from([(ERROR_KEY.to_string(), ERROR_ADVICE.to_string())])
}
