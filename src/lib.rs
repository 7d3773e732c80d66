//! neuroscreen - Diabetic peripheral neuropathy risk screening
//!
//! Combines a clinical feature vector with a learned probability model and
//! falls back to a deterministic heuristic whenever the model is missing,
//! mismatched or fails. The score is classified against symptom-adjusted
//! thresholds and annotated with recommendations.
//!
//! # Architecture
//!
//! - **features**: fixed-order feature vector and EMG window statistics
//! - **model**: shape-adaptive adapter, candle backend, scoped sessions
//! - **scoring**: fallback scorer, classifier, recommendations
//! - **assessment**: the pipeline tying them together
//! - **persistence** / **acquisition**: storage and async sensor helpers
//!
//! ```no_run
//! let assessment = neuroscreen::assess(120.0, [20.0, 10.0, 20.0, 5.0, 2.0], true, true, 50.0, 5.0);
//! println!("{} ({:.2})", assessment.risk_level(), assessment.score());
//! ```

pub mod errors;
pub mod config;
pub mod features;
pub mod model;
pub mod scoring;
pub mod assessment;

// Collaborators around the core pipeline
pub mod acquisition;
pub mod persistence;

// Re-export commonly used types
pub use errors::{Result, ScreeningError};
pub use config::Config;
pub use features::{EmgStats, FeatureVector};
pub use model::{InferenceResult, ModelSession, ModelSource, ScalarModel, TensorShape};
pub use scoring::{classify, fallback_score, recommend, RiskLevel};
pub use assessment::{assess, AssessmentRequest, RiskAssessment, RiskAssessor};
pub use acquisition::{assess_async, EmgWindowCollector};
pub use persistence::{AssessmentRecord, AssessmentStore, JsonFileStore};
