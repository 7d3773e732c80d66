//! Feature extraction
//!
//! Builds the fixed-order feature vector consumed by both the model adapter
//! and the fallback scorer, and summarizes raw EMG windows into the five
//! statistics the vector carries.

pub mod emg;
pub mod vector;

pub use emg::{EmgPattern, EmgStats, DEFAULT_BASELINE};
pub use vector::{
    validate_glucose_reading, FeatureIndex, FeatureVector, FeatureVectorBuilder, FEATURE_COUNT,
};
