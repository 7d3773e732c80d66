//! Scoped model acquisition
//!
//! A `ModelSession` owns the model handle for exactly one analysis. The handle
//! is released when the session is dropped, whichever way the analysis ends.

use crate::errors::ScreeningError;
use crate::features::FeatureVector;
use crate::model::adapter::{self, panic_message, InferenceResult};
use crate::model::types::{ModelSource, ScalarModel};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Model handle scoped to one analysis
pub struct ModelSession {
    model: Option<Box<dyn ScalarModel>>,
    load_failure: Option<String>,
    source: String,
}

impl ModelSession {
    /// Acquire a model from `source`.
    ///
    /// Never fails: a missing source, load error or panicking loader leaves
    /// the session without a model and records why.
    pub fn open(source: Option<&dyn ModelSource>) -> Self {
        let Some(source) = source else {
            return Self {
                model: None,
                load_failure: Some("no model source configured".to_string()),
                source: "none".to_string(),
            };
        };

        let description = source.describe();
        let loaded = panic::catch_unwind(AssertUnwindSafe(|| source.load()))
            .unwrap_or_else(|payload| {
                Err(ScreeningError::ModelUnavailable(format!(
                    "model loader panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

        match loaded {
            Ok(model) => {
                debug!(source = %description, "Model session opened");
                Self {
                    model: Some(model),
                    load_failure: None,
                    source: description,
                }
            }
            Err(err) => {
                warn!(source = %description, error = %err, "Model unavailable");
                Self {
                    model: None,
                    load_failure: Some(err.to_string()),
                    source: description,
                }
            }
        }
    }

    /// Wrap an already loaded model
    pub fn with_model(model: Box<dyn ScalarModel>) -> Self {
        Self {
            model: Some(model),
            load_failure: None,
            source: "in-memory model".to_string(),
        }
    }

    pub fn model(&self) -> Option<&dyn ScalarModel> {
        self.model.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Why the model could not be acquired, if it wasn't
    pub fn load_failure(&self) -> Option<&str> {
        self.load_failure.as_deref()
    }

    /// Score features with the session's model
    pub fn infer(&self, features: &FeatureVector) -> InferenceResult {
        match self.model() {
            Some(model) => adapter::infer(model, features),
            None => InferenceResult::model_failed(
                self.load_failure
                    .clone()
                    .unwrap_or_else(|| "model not loaded".to_string()),
            ),
        }
    }
}

impl Drop for ModelSession {
    fn drop(&mut self) {
        if let Some(model) = self.model.take() {
            drop(model);
            debug!(source = %self.source, "Model session released");
        }
    }
}
