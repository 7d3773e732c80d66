//! Threshold-based risk classification
//!
//! The moderate cut point starts at 0.6 and is lowered for elevated glucose
//! and for missing sensory responses; the high cut point sits 0.30 above it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Moderate threshold before adjustments
pub const BASE_THRESHOLD: f32 = 0.6;

/// Distance from the moderate to the high threshold
pub const HIGH_RISK_MARGIN: f32 = 0.3;

/// Discrete risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Label shown to users
    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Adjusted cut points for one patient context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores strictly above this are at least `Moderate`
    pub moderate: f32,

    /// Scores strictly above this are `High`
    pub high: f32,
}

impl RiskThresholds {
    /// Tier for a score. Boundary values fall to the lower tier; non-finite scores are `Low`.
    pub fn level_for(&self, score: f32) -> RiskLevel {
        if score > self.high {
            RiskLevel::High
        } else if score > self.moderate {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Compute the adjusted thresholds.
///
/// Glucose above 200 lowers the moderate threshold by 0.10, otherwise above 140
/// by 0.05. Both sensations missing lowers it a further 0.15, exactly one
/// missing by 0.05.
pub fn risk_thresholds(glucose: f32, has_temperature: bool, has_pressure: bool) -> RiskThresholds {
    let mut threshold = BASE_THRESHOLD;

    if glucose > 200.0 {
        threshold -= 0.1;
    } else if glucose > 140.0 {
        threshold -= 0.05;
    }

    if !has_temperature && !has_pressure {
        threshold -= 0.15;
    } else if !has_temperature || !has_pressure {
        threshold -= 0.05;
    }

    RiskThresholds {
        moderate: threshold,
        high: threshold + HIGH_RISK_MARGIN,
    }
}

/// Classify a probability in its patient context
pub fn classify(score: f32, glucose: f32, has_temperature: bool, has_pressure: bool) -> RiskLevel {
    let thresholds = risk_thresholds(glucose, has_temperature, has_pressure);
    let level = thresholds.level_for(score);
    debug!(
        score,
        moderate = thresholds.moderate,
        high = thresholds.high,
        %level,
        "Risk classified"
    );
    level
}
