//! Shared model doubles for integration tests

#![allow(dead_code)]

use neuroscreen::model::InputTensor;
use neuroscreen::{ModelSource, Result, ScalarModel, ScreeningError, TensorShape};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Model whose every run fails
pub struct FailingModel {
    input: TensorShape,
    output: TensorShape,
}

impl FailingModel {
    pub fn new() -> Self {
        Self {
            input: TensorShape::new(vec![1, 10]).unwrap(),
            output: TensorShape::new(vec![1, 1]).unwrap(),
        }
    }
}

impl ScalarModel for FailingModel {
    fn input_shape(&self) -> &TensorShape {
        &self.input
    }

    fn output_shape(&self) -> &TensorShape {
        &self.output
    }

    fn run(&self, _input: &InputTensor) -> Result<Vec<f32>> {
        Err(ScreeningError::InferenceRuntime("interpreter crashed".to_string()))
    }
}

/// Model that panics inside `run`
pub struct PanickingModel {
    input: TensorShape,
    output: TensorShape,
}

impl PanickingModel {
    pub fn new() -> Self {
        Self {
            input: TensorShape::new(vec![1, 10]).unwrap(),
            output: TensorShape::new(vec![1, 1]).unwrap(),
        }
    }
}

impl ScalarModel for PanickingModel {
    fn input_shape(&self) -> &TensorShape {
        &self.input
    }

    fn output_shape(&self) -> &TensorShape {
        &self.output
    }

    fn run(&self, _input: &InputTensor) -> Result<Vec<f32>> {
        panic!("native code aborted")
    }
}

/// Model that records the input it received and returns a fixed probability
pub struct RecordingModel {
    input: TensorShape,
    output: TensorShape,
    probability: f32,
    pub seen: Arc<Mutex<Vec<f32>>>,
}

impl RecordingModel {
    pub fn new(input: Vec<usize>, probability: f32) -> Self {
        Self {
            input: TensorShape::new(input).unwrap(),
            output: TensorShape::new(vec![1, 1]).unwrap(),
            probability,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScalarModel for RecordingModel {
    fn input_shape(&self) -> &TensorShape {
        &self.input
    }

    fn output_shape(&self) -> &TensorShape {
        &self.output
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>> {
        *self.seen.lock().unwrap() = input.data().to_vec();
        Ok(vec![self.probability])
    }
}

/// Source handing out a fresh model per session and counting loads and releases
pub struct CountingSource<F> {
    factory: F,
    pub loads: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl<F> CountingSource<F>
where
    F: Fn() -> Box<dyn ScalarModel> + Send + Sync,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            loads: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<F> ModelSource for CountingSource<F>
where
    F: Fn() -> Box<dyn ScalarModel> + Send + Sync,
{
    fn load(&self) -> Result<Box<dyn ScalarModel>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Released {
            inner: (self.factory)(),
            releases: Arc::clone(&self.releases),
        }))
    }
}

/// Counts its own drop
struct Released {
    inner: Box<dyn ScalarModel>,
    releases: Arc<AtomicUsize>,
}

impl ScalarModel for Released {
    fn input_shape(&self) -> &TensorShape {
        self.inner.input_shape()
    }

    fn output_shape(&self) -> &TensorShape {
        self.inner.output_shape()
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>> {
        self.inner.run(input)
    }
}

impl Drop for Released {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
