//! Shape-adaptive model adapter
//!
//! Fits the fixed-length feature vector to whatever input geometry the model
//! reports, runs it, and pulls a single probability out of the output. Every
//! failure is folded into the returned `InferenceResult`; nothing escapes this
//! boundary as an error or a panic.

use crate::errors::{Result, ScreeningError};
use crate::features::FeatureVector;
use crate::model::types::{InputTensor, ScalarModel, TensorShape};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Value written into input slots the feature vector cannot fill.
///
/// Extra model inputs behave as a bias slot; zero padding skews predictions.
pub const BIAS_SLOT_DEFAULT: f32 = 1.0;

/// Outcome of one scoring attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Probability in `[0, 1]`; absent when no path produced a score
    pub score: Option<f32>,

    /// Whether the learned model produced `score`
    pub used_model: bool,

    /// Model-path failure, if any
    pub failure: Option<String>,
}

impl InferenceResult {
    /// Score produced by the model
    pub fn from_model(score: f32) -> Self {
        Self {
            score: Some(score),
            used_model: true,
            failure: None,
        }
    }

    /// Model path failed and no score is available yet
    pub fn model_failed(reason: impl Into<String>) -> Self {
        Self {
            score: None,
            used_model: false,
            failure: Some(reason.into()),
        }
    }

    /// Replace a missing score with one from the fallback path, keeping the failure
    pub fn with_fallback(self, score: f32) -> Self {
        Self {
            score: Some(score),
            used_model: false,
            failure: self.failure,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.score.is_some()
    }
}

/// Resize features to `required` slots: copy the leading values and fill the
/// rest with `BIAS_SLOT_DEFAULT`
pub fn adjust_features(features: &[f32], required: usize) -> Vec<f32> {
    if features.len() == required {
        return features.to_vec();
    }

    let copy_len = features.len().min(required);
    let mut adjusted = Vec::with_capacity(required);
    adjusted.extend_from_slice(&features[..copy_len]);
    adjusted.resize(required, BIAS_SLOT_DEFAULT);

    debug!(
        provided = features.len(),
        required,
        padded = required - copy_len,
        "Adjusted feature vector to model input length"
    );
    adjusted
}

/// Lay out the (adjusted) features in the model's input geometry
pub fn build_input(shape: &TensorShape, features: &FeatureVector) -> Result<InputTensor> {
    // Checked before any allocation sized by the model's geometry
    shape.ensure_input_sized()?;
    let required = shape.feature_axis_len()?;
    let adjusted = adjust_features(features.as_slice(), required);

    match shape.rank() {
        2 => InputTensor::new(TensorShape::new(vec![1, required])?, adjusted),
        3 => {
            // Literal model dims; feature i lives at [0, i, 0]
            let dims = shape.dims();
            let channels = dims[2];
            let mut data = vec![0.0; shape.element_count()];
            for (i, value) in adjusted.iter().enumerate() {
                data[i * channels] = *value;
            }
            InputTensor::new(shape.clone(), data)
        }
        4 => InputTensor::new(TensorShape::new(vec![1, 1, 1, required])?, adjusted),
        rank => Err(ScreeningError::shape(
            shape,
            format!("input rank {} is not supported", rank),
        )),
    }
}

/// Run the model and read a single probability from its output
pub fn extract_score(model: &dyn ScalarModel, input: &InputTensor) -> Result<f32> {
    let output_shape = model.output_shape();

    let raw = if output_shape.is_single_value() {
        let values = model.run(input)?;
        values.first().copied().ok_or_else(|| {
            ScreeningError::InferenceRuntime("model returned an empty output".to_string())
        })?
    } else {
        debug!(shape = %output_shape, "Reading scalar from raw output buffer");
        let bytes = model.run_raw(input)?;
        let head: [u8; 4] = bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                ScreeningError::InferenceRuntime(format!(
                    "output buffer of {} bytes holds no f32",
                    bytes.len()
                ))
            })?;
        f32::from_ne_bytes(head)
    };

    if !raw.is_finite() || !(0.0..=1.0).contains(&raw) {
        return Err(ScreeningError::InferenceRuntime(format!(
            "model produced {} which is not a probability",
            raw
        )));
    }
    Ok(raw)
}

/// Shape, run and read the model, propagating the first failure
pub fn try_infer(model: &dyn ScalarModel, features: &FeatureVector) -> Result<f32> {
    let input_shape = model.input_shape();
    debug!(
        input = %input_shape,
        output = %model.output_shape(),
        "Running model inference"
    );
    let input = build_input(input_shape, features)?;
    extract_score(model, &input)
}

/// Score features with the model.
///
/// Failures, including panics raised inside the backend, come back as an
/// `InferenceResult` without a score so the caller can fall back.
pub fn infer(model: &dyn ScalarModel, features: &FeatureVector) -> InferenceResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_infer(model, features)));

    match outcome {
        Ok(Ok(score)) => {
            debug!(score, "Model inference succeeded");
            InferenceResult::from_model(score)
        }
        Ok(Err(err)) => {
            warn!(error = %err, "Model inference failed");
            InferenceResult::model_failed(err.to_string())
        }
        Err(payload) => {
            let err = ScreeningError::InferenceRuntime(format!(
                "model panicked: {}",
                panic_message(payload.as_ref())
            ));
            warn!(error = %err, "Model inference panicked");
            InferenceResult::model_failed(err.to_string())
        }
    }
}

/// Text carried by a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
