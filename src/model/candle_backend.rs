//! Logistic probability model on candle tensors
//!
//! The artifact is a safetensors file with two entries: `weight`, whose shape
//! is the model's input geometry, and `bias`, whose shape is the output
//! geometry. Inference is `sigmoid(sum(input * weight) + bias)`.

use crate::errors::{Result, ScreeningError};
use crate::model::types::{InputTensor, ModelSource, ScalarModel, TensorShape};
use candle_core::safetensors::MmapedSafetensors;
use candle_core::{DType, Device, Tensor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tensor name holding input weights
pub const WEIGHT_TENSOR: &str = "weight";

/// Tensor name holding the output bias
pub const BIAS_TENSOR: &str = "bias";

/// Probability model backed by candle tensors
pub struct CandleModel {
    weight: Tensor,
    bias: Tensor,
    input_shape: TensorShape,
    output_shape: TensorShape,
    device: Device,
}

impl CandleModel {
    /// Build a model from already materialized tensors
    pub fn from_tensors(weight: Tensor, bias: Tensor) -> Result<Self> {
        let input_shape = TensorShape::new(weight.dims().to_vec())?;
        let output_shape = TensorShape::new(bias.dims().to_vec())?;
        let device = weight.device().clone();

        Ok(Self {
            weight: weight.to_dtype(DType::F32)?,
            bias: bias.to_dtype(DType::F32)?,
            input_shape,
            output_shape,
            device,
        })
    }

    /// Load a model by memory-mapping a safetensors file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScreeningError::ModelUnavailable(format!(
                "model file {} not found",
                path.display()
            )));
        }

        let device = Device::Cpu;
        // SAFETY: the artifact is opened read-only and not modified while mapped.
        let mapped = unsafe { MmapedSafetensors::new(path) }
            .map_err(|e| unavailable(path.display(), e))?;
        let weight = mapped
            .load(WEIGHT_TENSOR, &device)
            .map_err(|e| unavailable(path.display(), e))?;
        let bias = mapped
            .load(BIAS_TENSOR, &device)
            .map_err(|e| unavailable(path.display(), e))?;

        let model = Self::from_tensors(weight, bias)?;
        info!(
            path = %path.display(),
            input = %model.input_shape,
            output = %model.output_shape,
            "Loaded probability model"
        );
        Ok(model)
    }

    /// Load a model from an in-memory safetensors buffer
    pub fn from_buffer(bytes: &[u8]) -> Result<Self> {
        let device = Device::Cpu;
        let mut tensors: HashMap<String, Tensor> =
            candle_core::safetensors::load_buffer(bytes, &device)
                .map_err(|e| unavailable("buffer", e))?;

        let weight = tensors.remove(WEIGHT_TENSOR).ok_or_else(|| {
            ScreeningError::ModelUnavailable(format!("artifact has no `{}` tensor", WEIGHT_TENSOR))
        })?;
        let bias = tensors.remove(BIAS_TENSOR).ok_or_else(|| {
            ScreeningError::ModelUnavailable(format!("artifact has no `{}` tensor", BIAS_TENSOR))
        })?;

        Self::from_tensors(weight, bias)
    }

    /// Write the model to a safetensors file
    pub fn save(&self, path: &Path) -> Result<()> {
        let tensors = HashMap::from([
            (WEIGHT_TENSOR, self.weight.clone()),
            (BIAS_TENSOR, self.bias.clone()),
        ]);
        candle_core::safetensors::save(&tensors, path)
            .map_err(|e| ScreeningError::Generic(format!("failed to save model: {}", e)))
    }
}

fn unavailable(origin: impl std::fmt::Display, err: candle_core::Error) -> ScreeningError {
    ScreeningError::ModelUnavailable(format!("cannot load model from {}: {}", origin, err))
}

impl ScalarModel for CandleModel {
    fn input_shape(&self) -> &TensorShape {
        &self.input_shape
    }

    fn output_shape(&self) -> &TensorShape {
        &self.output_shape
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>> {
        if input.shape() != &self.input_shape {
            return Err(ScreeningError::shape(
                input.shape(),
                format!("model expects input {}", self.input_shape),
            ));
        }

        let x = Tensor::from_vec(
            input.data().to_vec(),
            input.shape().dims().to_vec(),
            &self.device,
        )?;
        let logit = x.mul(&self.weight)?.sum_all()?;
        let logits = self.bias.broadcast_add(&logit)?;
        let probabilities = candle_nn::ops::sigmoid(&logits)?;
        let values = probabilities.flatten_all()?.to_vec1::<f32>()?;

        debug!(outputs = values.len(), "Candle model evaluated");
        Ok(values)
    }
}

/// Loads a `CandleModel` from a file for each analysis session
#[derive(Debug, Clone)]
pub struct CandleModelSource {
    path: PathBuf,
}

impl CandleModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelSource for CandleModelSource {
    fn load(&self) -> Result<Box<dyn ScalarModel>> {
        Ok(Box::new(CandleModel::load(&self.path)?))
    }

    fn describe(&self) -> String {
        format!("safetensors model at {}", self.path.display())
    }
}
