//! Screening pipeline
//!
//! Features → model (when available) → fallback on model failure →
//! classification → recommendations. The model is acquired per call through
//! a `ModelSession` and released before the result is returned.

use crate::assessment::types::{AssessmentRequest, RiskAssessment};
use crate::config::Config;
use crate::features::{EmgStats, FeatureVector};
use crate::model::{CandleModelSource, InferenceResult, ModelSession, ModelSource};
use crate::scoring::{classify, fallback_score, recommend};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn};

/// Score features with the session's model, falling back to the heuristic
/// scorer when the model path produces nothing. Always returns a score.
pub fn score_features(session: &ModelSession, features: &FeatureVector) -> InferenceResult {
    let result = session.infer(features);
    if result.is_complete() {
        return result;
    }

    let score = fallback_score(features);
    debug!(
        score,
        reason = result.failure.as_deref().unwrap_or("unknown"),
        "Using fallback score"
    );
    result.with_fallback(score)
}

/// Runs screenings against an optional model source
pub struct RiskAssessor {
    /// Produces a model per assessment; `None` runs fallback-only
    source: Option<Arc<dyn ModelSource>>,

    /// Active configuration
    config: Config,
}

impl RiskAssessor {
    /// Create an assessor without a model source
    pub fn new(config: Config) -> Self {
        Self {
            source: None,
            config,
        }
    }

    /// Fallback-only assessor with default configuration
    pub fn fallback_only() -> Self {
        Self::new(Config::default())
    }

    /// Create an assessor whose model comes from the configured safetensors file
    pub fn from_config(config: Config) -> Self {
        let source = config
            .model
            .path
            .as_ref()
            .map(|path| Arc::new(CandleModelSource::new(path)) as Arc<dyn ModelSource>);
        Self { source, config }
    }

    /// Use `source` for model acquisition
    pub fn with_source(mut self, source: Arc<dyn ModelSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_model_source(&self) -> bool {
        self.source.is_some()
    }

    /// Screen one request. Never fails: invalid input or an internal fault
    /// yields `RiskAssessment::safe_default`.
    pub fn assess(&self, request: &AssessmentRequest) -> RiskAssessment {
        let _span = debug_span!("assess", glucose = request.glucose).entered();

        if let Err(err) = request.validate() {
            warn!(error = %err, "Rejected assessment request");
            return RiskAssessment::safe_default(err.to_string());
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.run_pipeline(request))) {
            Ok(assessment) => assessment,
            Err(_) => {
                warn!("Assessment pipeline panicked, returning safe default");
                RiskAssessment::safe_default("internal failure during risk assessment")
            }
        }
    }

    fn run_pipeline(&self, request: &AssessmentRequest) -> RiskAssessment {
        let features = request.to_features();

        let result = {
            let session = ModelSession::open(self.source.as_deref());
            score_features(&session, &features)
        };

        let Some(score) = result.score else {
            return RiskAssessment::safe_default("no score was produced");
        };

        // Classification reads the same vector that was scored
        let glucose = features.fasting_glucose();
        let has_temperature = features.has_temperature_sensation();
        let has_pressure = features.has_pressure_sensation();

        let risk_level = classify(score, glucose, has_temperature, has_pressure);
        let recommendations = recommend(risk_level, glucose, has_temperature, has_pressure);

        let diagnostics = result
            .failure
            .map(|reason| vec![format!("model path skipped: {}", reason)])
            .unwrap_or_default();

        info!(
            score,
            %risk_level,
            used_model = result.used_model,
            recommendations = recommendations.len(),
            "Assessment complete"
        );

        RiskAssessment::new(
            score,
            risk_level,
            recommendations,
            result.used_model,
            diagnostics,
        )
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::fallback_only()
    }
}

/// Screen with the heuristic scorer only.
///
/// `emg_stats` is `[max amplitude, range, mean, std dev, baseline crossings]`.
pub fn assess(
    glucose: f32,
    emg_stats: [f32; 5],
    has_temperature_sensation: bool,
    has_pressure_sensation: bool,
    age: f32,
    diabetes_duration_years: f32,
) -> RiskAssessment {
    let request = AssessmentRequest {
        glucose,
        emg: EmgStats::from(emg_stats),
        has_temperature_sensation,
        has_pressure_sensation,
        age,
        diabetes_duration_years,
    };
    RiskAssessor::fallback_only().assess(&request)
}
