//! Probability model access
//!
//! Capability traits for opaque models, the shape-adaptive adapter that feeds
//! them, a candle-backed implementation, and the scoped session that owns a
//! loaded handle for one analysis.

pub mod adapter;
pub mod candle_backend;
pub mod session;
pub mod types;

pub use adapter::{infer, InferenceResult, BIAS_SLOT_DEFAULT};
pub use candle_backend::{CandleModel, CandleModelSource};
pub use session::ModelSession;
pub use types::{InputTensor, ModelSource, ScalarModel, TensorShape};
