//! Risk assessment pipeline
//! Turns a screening request into a classified, annotated risk decision

pub mod assessor;
pub mod types;

pub use assessor::{assess, score_features, RiskAssessor};
pub use types::{AssessmentRequest, RiskAssessment};
