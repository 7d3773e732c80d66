//! Fixed-order feature vector

use crate::errors::{Result, ScreeningError};
use crate::features::emg::EmgStats;
use serde::{Deserialize, Serialize};

/// Number of features in the vector
pub const FEATURE_COUNT: usize = 10;

/// Upper bound accepted for a fasting glucose reading (mg/dL)
const MAX_GLUCOSE_READING: f32 = 500.0;

/// Positions of each feature in the vector.
///
/// The model adapter and the fallback scorer both read by these indices;
/// reordering them breaks parity between the two scoring paths.
pub struct FeatureIndex;

impl FeatureIndex {
    pub const AGE: usize = 0;
    pub const DIABETES_DURATION: usize = 1;
    pub const FASTING_GLUCOSE: usize = 2;
    pub const EMG_MAX_AMPLITUDE: usize = 3;
    pub const EMG_RANGE: usize = 4;
    pub const EMG_MEAN: usize = 5;
    pub const EMG_STD_DEV: usize = 6;
    pub const EMG_BASELINE_CROSSINGS: usize = 7;
    pub const TEMPERATURE_SENSATION: usize = 8;
    pub const PRESSURE_SENSATION: usize = 9;
}

/// Immutable feature vector in the documented order:
/// `[age, duration, glucose, emg max, emg range, emg mean, emg std dev,
/// emg crossings, temperature flag, pressure flag]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Start building a vector from neutral defaults
    pub fn builder() -> FeatureVectorBuilder {
        FeatureVectorBuilder::default()
    }

    /// Wrap raw values that are already in feature order
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value at a `FeatureIndex` position
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn age(&self) -> f32 {
        self.values[FeatureIndex::AGE]
    }

    pub fn diabetes_duration_years(&self) -> f32 {
        self.values[FeatureIndex::DIABETES_DURATION]
    }

    pub fn fasting_glucose(&self) -> f32 {
        self.values[FeatureIndex::FASTING_GLUCOSE]
    }

    /// The five EMG statistics as stored in the vector
    pub fn emg(&self) -> EmgStats {
        let mut stats = [0.0; 5];
        stats.copy_from_slice(
            &self.values[FeatureIndex::EMG_MAX_AMPLITUDE..=FeatureIndex::EMG_BASELINE_CROSSINGS],
        );
        EmgStats::from(stats)
    }

    /// Temperature sensation flag; values above 0.5 count as present
    pub fn has_temperature_sensation(&self) -> bool {
        self.values[FeatureIndex::TEMPERATURE_SENSATION] > 0.5
    }

    /// Pressure sensation flag; values above 0.5 count as present
    pub fn has_pressure_sensation(&self) -> bool {
        self.values[FeatureIndex::PRESSURE_SENSATION] > 0.5
    }

    /// Whether every value is a finite number
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Builder for `FeatureVector`.
///
/// Unset fields keep the neutral defaults of the heuristic scorer: age 50,
/// 5 years duration, glucose 120 mg/dL, EMG amplitude 25, range 15, mean 10,
/// and both sensations present.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    age: f32,
    diabetes_duration_years: f32,
    fasting_glucose: f32,
    emg: EmgStats,
    has_temperature_sensation: bool,
    has_pressure_sensation: bool,
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        Self {
            age: 50.0,
            diabetes_duration_years: 5.0,
            fasting_glucose: 120.0,
            emg: EmgStats {
                max_amplitude: 25.0,
                range: 15.0,
                mean: 10.0,
                std_dev: 0.0,
                baseline_crossings: 0.0,
            },
            has_temperature_sensation: true,
            has_pressure_sensation: true,
        }
    }
}

impl FeatureVectorBuilder {
    pub fn age(mut self, age: f32) -> Self {
        self.age = age;
        self
    }

    pub fn diabetes_duration(mut self, years: f32) -> Self {
        self.diabetes_duration_years = years;
        self
    }

    pub fn fasting_glucose(mut self, glucose: f32) -> Self {
        self.fasting_glucose = glucose;
        self
    }

    pub fn emg(mut self, emg: EmgStats) -> Self {
        self.emg = emg;
        self
    }

    pub fn temperature_sensation(mut self, present: bool) -> Self {
        self.has_temperature_sensation = present;
        self
    }

    pub fn pressure_sensation(mut self, present: bool) -> Self {
        self.has_pressure_sensation = present;
        self
    }

    pub fn build(self) -> FeatureVector {
        let emg = self.emg.to_array();
        FeatureVector {
            values: [
                self.age,
                self.diabetes_duration_years,
                self.fasting_glucose,
                emg[0],
                emg[1],
                emg[2],
                emg[3],
                emg[4],
                flag(self.has_temperature_sensation),
                flag(self.has_pressure_sensation),
            ],
        }
    }
}

fn flag(present: bool) -> f32 {
    if present {
        1.0
    } else {
        0.0
    }
}

/// Validate a fasting glucose reading entered by the user (0 < value <= 500 mg/dL)
pub fn validate_glucose_reading(value: f32) -> Result<f32> {
    if !value.is_finite() {
        return Err(ScreeningError::InvalidInput(
            "glucose reading is not a number".to_string(),
        ));
    }
    if value <= 0.0 || value > MAX_GLUCOSE_READING {
        return Err(ScreeningError::InvalidInput(format!(
            "glucose reading {} mg/dL is outside (0, {}]",
            value, MAX_GLUCOSE_READING
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_places_values_in_documented_order() {
        let features = FeatureVector::builder()
            .age(62.0)
            .diabetes_duration(12.0)
            .fasting_glucose(185.0)
            .emg(EmgStats::from([18.0, 22.0, 14.0, 3.5, 7.0]))
            .temperature_sensation(false)
            .pressure_sensation(true)
            .build();

        assert_eq!(
            features.as_slice(),
            &[62.0, 12.0, 185.0, 18.0, 22.0, 14.0, 3.5, 7.0, 0.0, 1.0]
        );
        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(!features.has_temperature_sensation());
        assert!(features.has_pressure_sensation());
        assert_eq!(features.emg().to_array(), [18.0, 22.0, 14.0, 3.5, 7.0]);
    }

    #[test]
    fn test_builder_defaults_are_neutral() {
        let features = FeatureVector::builder().build();
        assert_eq!(features.age(), 50.0);
        assert_eq!(features.diabetes_duration_years(), 5.0);
        assert_eq!(features.fasting_glucose(), 120.0);
        assert!(features.has_temperature_sensation());
        assert!(features.has_pressure_sensation());
    }

    #[test]
    fn test_sensation_flag_threshold() {
        let mut values = [0.0; FEATURE_COUNT];
        values[FeatureIndex::TEMPERATURE_SENSATION] = 0.5;
        values[FeatureIndex::PRESSURE_SENSATION] = 0.51;
        let features = FeatureVector::from_values(values);
        assert!(!features.has_temperature_sensation());
        assert!(features.has_pressure_sensation());
    }

    #[test]
    fn test_non_finite_detected() {
        let features = FeatureVector::builder().fasting_glucose(f32::NAN).build();
        assert!(!features.is_finite());
        assert!(FeatureVector::builder().build().is_finite());
    }

    #[test]
    fn test_get_out_of_range() {
        let features = FeatureVector::builder().build();
        assert_eq!(features.get(FeatureIndex::AGE), Some(50.0));
        assert_eq!(features.get(FEATURE_COUNT), None);
    }

    #[test]
    fn test_glucose_reading_validation() {
        assert_eq!(validate_glucose_reading(95.0).unwrap(), 95.0);
        assert_eq!(validate_glucose_reading(500.0).unwrap(), 500.0);
        assert!(validate_glucose_reading(0.0).is_err());
        assert!(validate_glucose_reading(-3.0).is_err());
        assert!(validate_glucose_reading(500.5).is_err());
        assert!(validate_glucose_reading(f32::INFINITY).is_err());
    }
}
