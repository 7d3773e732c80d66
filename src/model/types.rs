//! Model capability types
//!
//! The adapter is written against `ScalarModel` only, so any backend that can
//! report its tensor geometry and map an input tensor to a probability can be
//! plugged in.

use crate::errors::{Result, ScreeningError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest input tensor the adapter will allocate for a model
pub const MAX_MODEL_INPUT_ELEMENTS: usize = 1 << 20;

/// Ordered, strictly positive tensor dimensions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorShape {
    dims: Vec<usize>,
}

impl TensorShape {
    /// Create a shape, rejecting empty shapes and zero-sized dimensions
    pub fn new(dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        if dims.is_empty() {
            return Err(ScreeningError::shape("[]", "shape has no dimensions"));
        }
        if dims.contains(&0) {
            return Err(ScreeningError::shape(
                format_dims(&dims),
                "dimensions must be positive",
            ));
        }
        Ok(Self { dims })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements, saturating at `usize::MAX`
    pub fn element_count(&self) -> usize {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .unwrap_or(usize::MAX)
    }

    /// Reject geometries larger than `MAX_MODEL_INPUT_ELEMENTS`
    pub fn ensure_input_sized(&self) -> Result<()> {
        if self.element_count() > MAX_MODEL_INPUT_ELEMENTS {
            return Err(ScreeningError::shape(
                self,
                format!("input elements exceed the limit of {}", MAX_MODEL_INPUT_ELEMENTS),
            ));
        }
        Ok(())
    }

    /// `[1, 1]`, the geometry whose single value is read directly
    pub fn is_single_value(&self) -> bool {
        self.dims == [1, 1]
    }

    /// Number of feature slots the model accepts.
    ///
    /// Rank 2 (`[batch, features]`) and rank 4 (`[1, 1, 1, features]`) carry
    /// features on the trailing axis; rank 3 carries them on the middle axis
    /// (`[batch, features, channels]`). Other ranks are unsupported.
    pub fn feature_axis_len(&self) -> Result<usize> {
        match self.rank() {
            2 => Ok(self.dims[1]),
            3 => Ok(self.dims[1]),
            4 => Ok(self.dims[3]),
            rank => Err(ScreeningError::shape(
                self,
                format!("input rank {} is not supported", rank),
            )),
        }
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_dims(&self.dims))
    }
}

fn format_dims(dims: &[usize]) -> String {
    let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Dense row-major `f32` tensor handed to a model
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    shape: TensorShape,
    data: Vec<f32>,
}

impl InputTensor {
    /// Create a tensor, checking that the data fills the shape exactly
    pub fn new(shape: TensorShape, data: Vec<f32>) -> Result<Self> {
        if data.len() != shape.element_count() {
            return Err(ScreeningError::shape(
                &shape,
                format!(
                    "{} values cannot fill {} elements",
                    data.len(),
                    shape.element_count()
                ),
            ));
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// A loaded model mapping a numeric tensor to a probability
pub trait ScalarModel: Send {
    /// Geometry the model expects as input
    fn input_shape(&self) -> &TensorShape;

    /// Geometry the model produces
    fn output_shape(&self) -> &TensorShape;

    /// Run the model and return its output values in row-major order
    fn run(&self, input: &InputTensor) -> Result<Vec<f32>>;

    /// Run the model and return the raw output buffer.
    ///
    /// Backends that only expose byte buffers override this; the default
    /// encodes `run` output as native-endian `f32`s.
    fn run_raw(&self, input: &InputTensor) -> Result<Vec<u8>> {
        let values = self.run(input)?;
        Ok(values.iter().flat_map(|v| v.to_ne_bytes()).collect())
    }
}

/// Produces a fresh model handle for one analysis session
pub trait ModelSource: Send + Sync {
    /// Load the model; missing or corrupt artifacts return `ModelUnavailable`
    fn load(&self) -> Result<Box<dyn ScalarModel>>;

    /// Short description used in diagnostics
    fn describe(&self) -> String {
        "model source".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_rejects_empty_and_zero() {
        assert!(TensorShape::new(Vec::new()).is_err());
        assert!(TensorShape::new(vec![1, 0]).is_err());
        assert!(TensorShape::new(vec![1, 11]).is_ok());
    }

    #[test]
    fn test_feature_axis_by_rank() {
        assert_eq!(TensorShape::new(vec![1, 11]).unwrap().feature_axis_len().unwrap(), 11);
        assert_eq!(TensorShape::new(vec![1, 11, 1]).unwrap().feature_axis_len().unwrap(), 11);
        assert_eq!(TensorShape::new(vec![1, 1, 1, 9]).unwrap().feature_axis_len().unwrap(), 9);
        assert!(TensorShape::new(vec![10]).unwrap().feature_axis_len().is_err());
        assert!(TensorShape::new(vec![1, 1, 1, 1, 10]).unwrap().feature_axis_len().is_err());
    }

    #[test]
    fn test_shape_display() {
        let shape = TensorShape::new(vec![1, 11, 1]).unwrap();
        assert_eq!(shape.to_string(), "[1, 11, 1]");
        assert_eq!(shape.element_count(), 11);
        assert!(!shape.is_single_value());
        assert!(TensorShape::new(vec![1, 1]).unwrap().is_single_value());
    }

    #[test]
    fn test_oversized_geometry_rejected() {
        let huge = TensorShape::new(vec![1, 1 << 42]).unwrap();
        assert!(matches!(
            huge.ensure_input_sized(),
            Err(ScreeningError::ShapeError { .. })
        ));

        let overflowing = TensorShape::new(vec![usize::MAX, 2, 2]).unwrap();
        assert_eq!(overflowing.element_count(), usize::MAX);
        assert!(overflowing.ensure_input_sized().is_err());

        let limit = TensorShape::new(vec![1, MAX_MODEL_INPUT_ELEMENTS]).unwrap();
        assert!(limit.ensure_input_sized().is_ok());
    }

    #[test]
    fn test_input_tensor_length_checked() {
        let shape = TensorShape::new(vec![1, 3]).unwrap();
        assert!(InputTensor::new(shape.clone(), vec![1.0, 2.0]).is_err());
        let tensor = InputTensor::new(shape, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(tensor.data(), &[1.0, 2.0, 3.0]);
    }
}
