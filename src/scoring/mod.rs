//! Risk scoring
//!
//! Heuristic fallback scorer, threshold classifier and recommendation
//! generator. Everything here is total: no function returns an error.

pub mod classifier;
pub mod fallback;
pub mod recommendations;

pub use classifier::{classify, risk_thresholds, RiskLevel, RiskThresholds};
pub use fallback::{fallback_breakdown, fallback_score, SubRiskBreakdown, NEUTRAL_SCORE};
pub use recommendations::{recommend, safe_default_recommendations};
