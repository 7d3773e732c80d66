//! EMG window statistics
//!
//! Reduces a window of raw EMG amplitude samples to the five scalars the
//! feature vector carries, and labels the window with a coarse pattern for
//! presentation.

use serde::{Deserialize, Serialize};

/// Baseline amplitude used for crossing counts when none is configured
pub const DEFAULT_BASELINE: f32 = 20.0;

/// Range above which a window is reported as highly variable
const HIGH_VARIABILITY_RANGE: f32 = 30.0;

/// Crossing count above which a window is reported as oscillating
const FREQUENT_OSCILLATION_CROSSINGS: f32 = 10.0;

/// Summary statistics of one EMG window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmgStats {
    /// Largest sample in the window
    pub max_amplitude: f32,

    /// `max - min` over the window
    pub range: f32,

    /// Arithmetic mean
    pub mean: f32,

    /// Population standard deviation
    pub std_dev: f32,

    /// Number of transitions across the baseline
    pub baseline_crossings: f32,
}

/// Coarse label for an EMG window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmgPattern {
    HighVariability,
    FrequentOscillation,
    Normal,
}

impl EmgPattern {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            EmgPattern::HighVariability => "High variability pattern",
            EmgPattern::FrequentOscillation => "Frequent oscillation pattern",
            EmgPattern::Normal => "Normal pattern",
        }
    }
}

impl EmgStats {
    /// Compute statistics over a sample window.
    ///
    /// An empty window yields all zeros. Crossings are counted from the first
    /// sample onward: a crossing happens when consecutive samples fall on
    /// opposite sides of `baseline`, with `baseline` itself counted as above.
    pub fn from_samples(samples: &[f32], baseline: f32) -> Self {
        let Some(&first) = samples.first() else {
            return Self::default();
        };

        let mut max = f32::MIN;
        let mut min = f32::MAX;
        let mut sum = 0.0f32;
        let mut crossings = 0u32;
        let mut prev = first;

        for &value in samples {
            max = max.max(value);
            min = min.min(value);
            sum += value;

            let was_below = prev < baseline;
            let is_below = value < baseline;
            if was_below != is_below {
                crossings += 1;
            }
            prev = value;
        }

        let n = samples.len() as f32;
        let mean = sum / n;
        let variance = samples
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f32>()
            / n;

        Self {
            max_amplitude: max,
            range: max - min,
            mean,
            std_dev: variance.sqrt(),
            baseline_crossings: crossings as f32,
        }
    }

    /// Statistics in feature-vector order
    pub fn to_array(&self) -> [f32; 5] {
        [
            self.max_amplitude,
            self.range,
            self.mean,
            self.std_dev,
            self.baseline_crossings,
        ]
    }

    /// Classify the window shape
    pub fn pattern(&self) -> EmgPattern {
        if self.range > HIGH_VARIABILITY_RANGE {
            EmgPattern::HighVariability
        } else if self.baseline_crossings > FREQUENT_OSCILLATION_CROSSINGS {
            EmgPattern::FrequentOscillation
        } else {
            EmgPattern::Normal
        }
    }
}

impl From<[f32; 5]> for EmgStats {
    fn from(stats: [f32; 5]) -> Self {
        Self {
            max_amplitude: stats[0],
            range: stats[1],
            mean: stats[2],
            std_dev: stats[3],
            baseline_crossings: stats[4],
        }
    }
}
