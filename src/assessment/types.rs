//! Assessment request and result types

use crate::config::PatientDefaults;
use crate::errors::{Result, ScreeningError};
use crate::features::{EmgStats, FeatureVector};
use crate::scoring::recommendations::safe_default_recommendations;
use crate::scoring::RiskLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inputs gathered for one screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Fasting glucose in mg/dL
    pub glucose: f32,

    /// Statistics of the recorded EMG window
    pub emg: EmgStats,

    /// Patient felt the temperature stimulus
    pub has_temperature_sensation: bool,

    /// Patient felt the pressure stimulus
    pub has_pressure_sensation: bool,

    /// Age in years
    pub age: f32,

    /// Years since diabetes diagnosis
    pub diabetes_duration_years: f32,
}

impl AssessmentRequest {
    /// Create a request, taking age and duration from profile defaults
    pub fn with_defaults(
        glucose: f32,
        emg: EmgStats,
        has_temperature_sensation: bool,
        has_pressure_sensation: bool,
        defaults: &PatientDefaults,
    ) -> Self {
        Self {
            glucose,
            emg,
            has_temperature_sensation,
            has_pressure_sensation,
            age: defaults.age,
            diabetes_duration_years: defaults.diabetes_duration_years,
        }
    }

    /// Reject requests holding NaN or infinite values
    pub fn validate(&self) -> Result<()> {
        let numeric = [
            ("glucose", self.glucose),
            ("age", self.age),
            ("diabetes duration", self.diabetes_duration_years),
            ("EMG max amplitude", self.emg.max_amplitude),
            ("EMG range", self.emg.range),
            ("EMG mean", self.emg.mean),
            ("EMG standard deviation", self.emg.std_dev),
            ("EMG baseline crossings", self.emg.baseline_crossings),
        ];

        match numeric.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(ScreeningError::InvalidInput(format!(
                "{} is not a finite number ({})",
                name, value
            ))),
            None => Ok(()),
        }
    }

    /// Assemble the feature vector scored by both paths
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector::builder()
            .age(self.age)
            .diabetes_duration(self.diabetes_duration_years)
            .fasting_glucose(self.glucose)
            .emg(self.emg)
            .temperature_sensation(self.has_temperature_sensation)
            .pressure_sensation(self.has_pressure_sensation)
            .build()
    }
}

/// Final screening decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    score: f32,
    risk_level: RiskLevel,
    recommendations: BTreeMap<String, String>,
    used_model: bool,
    #[serde(default)]
    diagnostics: Vec<String>,
}

impl RiskAssessment {
    pub(crate) fn new(
        score: f32,
        risk_level: RiskLevel,
        recommendations: BTreeMap<String, String>,
        used_model: bool,
        diagnostics: Vec<String>,
    ) -> Self {
        Self {
            score,
            risk_level,
            recommendations,
            used_model,
            diagnostics,
        }
    }

    /// Result reported when the pipeline could not complete: LOW, score 0,
    /// a single error advisory
    pub fn safe_default(reason: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            risk_level: RiskLevel::Low,
            recommendations: safe_default_recommendations(),
            used_model: false,
            diagnostics: vec![reason.into()],
        }
    }

    /// Probability of neuropathy in `[0, 1]`
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Advisories keyed by title
    pub fn recommendations(&self) -> &BTreeMap<String, String> {
        &self.recommendations
    }

    /// Whether the learned model produced the score
    pub fn used_model(&self) -> bool {
        self.used_model
    }

    /// Why the model path or the pipeline was bypassed, if it was
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Score as a whole percentage for display
    pub fn score_percent(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::recommendations::ERROR_KEY;

    fn request() -> AssessmentRequest {
        AssessmentRequest::with_defaults(
            130.0,
            EmgStats::from([20.0, 10.0, 20.0, 5.0, 2.0]),
            true,
            false,
            &PatientDefaults::default(),
        )
    }

    #[test]
    fn test_defaults_fill_age_and_duration() {
        let request = request();
        assert_eq!(request.age, 50.0);
        assert_eq!(request.diabetes_duration_years, 5.0);
    }

    #[test]
    fn test_features_follow_request() {
        let features = request().to_features();
        assert_eq!(features.fasting_glucose(), 130.0);
        assert!(features.has_temperature_sensation());
        assert!(!features.has_pressure_sensation());
        assert_eq!(features.emg().to_array(), [20.0, 10.0, 20.0, 5.0, 2.0]);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.emg.mean = f32::NAN;
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("EMG mean"));

        let mut bad = request();
        bad.age = f32::INFINITY;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_safe_default_shape() {
        let assessment = RiskAssessment::safe_default("boom");
        assert_eq!(assessment.score(), 0.0);
        assert_eq!(assessment.risk_level(), RiskLevel::Low);
        assert!(!assessment.used_model());
        assert_eq!(assessment.recommendations().len(), 1);
        assert!(assessment.recommendations().contains_key(ERROR_KEY));
        assert_eq!(assessment.diagnostics(), &["boom".to_string()]);
    }

    #[test]
    fn test_serializes_level_in_uppercase() {
        let assessment = RiskAssessment::safe_default("boom");
        let json = serde_json::to_string(&assessment).unwrap();
        assert!(json.contains("\"risk_level\":\"LOW\""));
        let back: RiskAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, assessment);
    }

    #[test]
    fn test_score_percent() {
        let assessment = RiskAssessment::new(0.199_917, RiskLevel::Low, BTreeMap::new(), false, vec![]);
        assert_eq!(assessment.score_percent(), 20);
    }
}
