//! Heuristic fallback scorer
//!
//! Deterministic replacement for the learned model. Five sub-risks, each a
//! step function (or, for duration, a logistic curve) of raw features, are
//! combined with fixed clinical weights and scaled so the output distribution
//! stays comparable with the model path. Thresholds, weights and the scale
//! factor are product behavior and must not be tuned here.

use crate::features::{FeatureIndex, FeatureVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Final scaling applied to the weighted sum
pub const FALLBACK_SCALE: f32 = 0.85;

/// Returned when the computation cannot produce a finite score
pub const NEUTRAL_SCORE: f32 = 0.5;

const GLUCOSE_WEIGHT: f32 = 0.30;
const DURATION_WEIGHT: f32 = 0.15;
const AGE_WEIGHT: f32 = 0.10;
const EMG_WEIGHT: f32 = 0.25;
const SENSATION_WEIGHT: f32 = 0.10;

const AMPLITUDE_BLEND: f32 = 0.4;
const FREQUENCY_BLEND: f32 = 0.3;
const VARIABILITY_BLEND: f32 = 0.3;

// (threshold, risk) pairs, checked in order
const GLUCOSE_STEPS: [(f32, f32); 4] = [(200.0, 0.6), (170.0, 0.45), (140.0, 0.3), (120.0, 0.2)];
const AGE_STEPS: [(f32, f32); 4] = [(65.0, 0.8), (55.0, 0.6), (45.0, 0.4), (35.0, 0.2)];
const AMPLITUDE_STEPS: [(f32, f32); 4] = [(15.0, 0.9), (20.0, 0.7), (25.0, 0.5), (30.0, 0.3)];
const FREQUENCY_STEPS: [(f32, f32); 4] = [(30.0, 0.9), (25.0, 0.7), (20.0, 0.5), (15.0, 0.3)];
const VARIABILITY_STEPS: [(f32, f32); 4] = [(25.0, 0.9), (20.0, 0.7), (15.0, 0.5), (10.0, 0.3)];
const STEP_FLOOR: f32 = 0.1;

/// Logistic duration curve: midpoint and slope
const DURATION_MIDPOINT_YEARS: f64 = 7.0;
const DURATION_SLOPE: f64 = 0.2;

/// Risk for the first threshold the value strictly exceeds
fn step_above(value: f32, steps: &[(f32, f32)]) -> f32 {
    steps
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map(|(_, risk)| *risk)
        .unwrap_or(STEP_FLOOR)
}

/// Risk for the first threshold the value is strictly below
fn step_below(value: f32, steps: &[(f32, f32)]) -> f32 {
    steps
        .iter()
        .find(|(threshold, _)| value < *threshold)
        .map(|(_, risk)| *risk)
        .unwrap_or(STEP_FLOOR)
}

/// Fasting glucose sub-risk
pub fn glucose_risk(glucose: f32) -> f32 {
    step_above(glucose, &GLUCOSE_STEPS)
}

/// Diabetes duration factor: `1 / (1 + e^(-0.2 (years - 7)))`
pub fn duration_factor(years: f32) -> f32 {
    let exponent = -DURATION_SLOPE * (f64::from(years) - DURATION_MIDPOINT_YEARS);
    (1.0 / (1.0 + exponent.exp())) as f32
}

/// Age sub-risk
pub fn age_factor(age: f32) -> f32 {
    step_above(age, &AGE_STEPS)
}

/// Lower amplitude is riskier
pub fn amplitude_risk(amplitude: f32) -> f32 {
    step_below(amplitude, &AMPLITUDE_STEPS)
}

/// Frequency proxy (the EMG range feature); higher is riskier
pub fn frequency_risk(frequency: f32) -> f32 {
    step_above(frequency, &FREQUENCY_STEPS)
}

/// Variability proxy (the EMG mean feature); higher is riskier
pub fn variability_risk(variability: f32) -> f32 {
    step_above(variability, &VARIABILITY_STEPS)
}

/// Blend of the three EMG sub-risks
pub fn emg_risk(amplitude: f32, frequency: f32, variability: f32) -> f32 {
    amplitude_risk(amplitude) * AMPLITUDE_BLEND
        + frequency_risk(frequency) * FREQUENCY_BLEND
        + variability_risk(variability) * VARIABILITY_BLEND
}

/// Sensation sub-risk from the two questionnaire answers
pub fn sensation_risk(has_temperature: bool, has_pressure: bool) -> f32 {
    match (has_temperature, has_pressure) {
        (false, false) => 0.9,
        (true, true) => 0.1,
        _ => 0.5,
    }
}

/// Individual sub-risks behind a fallback score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubRiskBreakdown {
    pub glucose: f32,
    pub duration: f32,
    pub age: f32,
    pub emg: f32,
    pub sensation: f32,
}

impl SubRiskBreakdown {
    /// Weighted sum before scaling
    pub fn weighted_sum(&self) -> f32 {
        self.glucose * GLUCOSE_WEIGHT
            + self.duration * DURATION_WEIGHT
            + self.age * AGE_WEIGHT
            + self.emg * EMG_WEIGHT
            + self.sensation * SENSATION_WEIGHT
    }

    /// Scaled and clamped score; non-finite sums degrade to `NEUTRAL_SCORE`
    pub fn score(&self) -> f32 {
        let scaled = self.weighted_sum() * FALLBACK_SCALE;
        if !scaled.is_finite() {
            warn!(breakdown = ?self, "Fallback score is not finite, using neutral score");
            return NEUTRAL_SCORE;
        }
        scaled.clamp(0.0, 1.0)
    }
}

/// Compute every sub-risk for a feature vector
pub fn fallback_breakdown(features: &FeatureVector) -> SubRiskBreakdown {
    let value = |index: usize| features.as_slice()[index];

    SubRiskBreakdown {
        glucose: glucose_risk(value(FeatureIndex::FASTING_GLUCOSE)),
        duration: duration_factor(value(FeatureIndex::DIABETES_DURATION)),
        age: age_factor(value(FeatureIndex::AGE)),
        emg: emg_risk(
            value(FeatureIndex::EMG_MAX_AMPLITUDE),
            value(FeatureIndex::EMG_RANGE),
            value(FeatureIndex::EMG_MEAN),
        ),
        sensation: sensation_risk(
            features.has_temperature_sensation(),
            features.has_pressure_sensation(),
        ),
    }
}

/// Heuristic neuropathy probability in `[0, 1]`. Total: never fails.
pub fn fallback_score(features: &FeatureVector) -> f32 {
    let breakdown = fallback_breakdown(features);
    let score = breakdown.score();
    debug!(?breakdown, score, "Fallback score computed");
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::EmgStats;
    use quickcheck_macros::quickcheck;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_glucose_steps() {
        for (glucose, expected) in [(250.0, 0.6), (180.0, 0.45), (150.0, 0.3), (130.0, 0.2), (100.0, 0.1)] {
            let features = FeatureVector::builder().fasting_glucose(glucose).build();
            assert_eq!(fallback_breakdown(&features).glucose, expected, "glucose {}", glucose);
        }
    }

    #[test]
    fn test_step_boundaries_are_strict() {
        assert_eq!(glucose_risk(200.0), 0.45);
        assert_eq!(glucose_risk(120.0), 0.1);
        assert_eq!(age_factor(65.0), 0.6);
        assert_eq!(age_factor(35.0), 0.1);
        assert_eq!(amplitude_risk(15.0), 0.7);
        assert_eq!(amplitude_risk(30.0), 0.1);
        assert_eq!(frequency_risk(30.0), 0.7);
        assert_eq!(variability_risk(10.0), 0.1);
    }

    #[test]
    fn test_duration_curve() {
        assert_close(duration_factor(7.0), 0.5);
        assert_close(duration_factor(5.0), 0.401_312);
        assert!(duration_factor(30.0) > 0.98);
        assert!(duration_factor(0.0) < 0.2);
    }

    #[test]
    fn test_sensation_combinations() {
        assert_eq!(sensation_risk(false, false), 0.9);
        assert_eq!(sensation_risk(true, false), 0.5);
        assert_eq!(sensation_risk(false, true), 0.5);
        assert_eq!(sensation_risk(true, true), 0.1);
    }

    #[test]
    fn test_emg_uses_range_and_mean_features() {
        // amplitude 20 -> 0.5, range 10 -> 0.1, mean 20 -> 0.5
        let features = FeatureVector::builder()
            .emg(EmgStats::from([20.0, 10.0, 20.0, 5.0, 2.0]))
            .build();
        assert_close(fallback_breakdown(&features).emg, 0.38);
    }

    #[test]
    fn test_reference_profile() {
        let features = FeatureVector::builder()
            .age(50.0)
            .diabetes_duration(5.0)
            .fasting_glucose(120.0)
            .emg(EmgStats::from([20.0, 10.0, 20.0, 5.0, 2.0]))
            .build();

        let breakdown = fallback_breakdown(&features);
        assert_eq!(breakdown.glucose, 0.1);
        assert_eq!(breakdown.age, 0.4);
        assert_eq!(breakdown.sensation, 0.1);
        assert_close(breakdown.weighted_sum(), 0.235_197);
        assert_close(fallback_score(&features), 0.199_917);
    }

    #[test]
    fn test_worst_case_stays_below_one() {
        let features = FeatureVector::builder()
            .age(80.0)
            .diabetes_duration(40.0)
            .fasting_glucose(320.0)
            .emg(EmgStats::from([5.0, 45.0, 40.0, 12.0, 30.0]))
            .temperature_sensation(false)
            .pressure_sensation(false)
            .build();
        let score = fallback_score(&features);
        assert!(score > 0.6 && score < 0.62, "score {}", score);
    }

    #[test]
    fn test_non_finite_duration_degrades_to_neutral() {
        let features = FeatureVector::builder().diabetes_duration(f32::NAN).build();
        assert_eq!(fallback_score(&features), NEUTRAL_SCORE);
    }

    #[quickcheck]
    fn prop_score_in_unit_interval(values: (f32, f32, f32, f32, f32, f32, bool, bool)) -> bool {
        let (age, duration, glucose, amplitude, range, mean, temp, pressure) = values;
        let features = FeatureVector::builder()
            .age(age)
            .diabetes_duration(duration)
            .fasting_glucose(glucose)
            .emg(EmgStats::from([amplitude, range, mean, 0.0, 0.0]))
            .temperature_sensation(temp)
            .pressure_sensation(pressure)
            .build();
        let score = fallback_score(&features);
        (0.0..=1.0).contains(&score)
    }

    #[quickcheck]
    fn prop_score_is_pure(values: Vec<f32>) -> bool {
        let mut raw = [0.0f32; 10];
        for (slot, value) in raw.iter_mut().zip(values) {
            *slot = value;
        }
        let features = FeatureVector::from_values(raw);
        fallback_score(&features).to_bits() == fallback_score(&features).to_bits()
    }
}
