//! Off-thread acquisition helpers
//!
//! Sensor samples arrive on a tokio channel. `EmgWindowCollector` turns a
//! bounded window of them into `EmgStats`, and `assess_async` moves the
//! synchronous pipeline onto the blocking pool so sensor I/O and scoring
//! never share a thread.

use crate::assessment::{AssessmentRequest, RiskAssessment, RiskAssessor};
use crate::config::AcquisitionConfig;
use crate::errors::{Result, ScreeningError};
use crate::features::EmgStats;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Collects one EMG analysis window from a sample stream
#[derive(Debug, Clone)]
pub struct EmgWindowCollector {
    /// Baseline for crossing counts
    baseline: f32,

    /// Samples per window
    window_size: usize,

    /// Maximum wait for each sample
    read_timeout: Duration,
}

impl EmgWindowCollector {
    /// Create a collector with default settings
    pub fn new() -> Self {
        Self::with_config(&AcquisitionConfig::default())
    }

    /// Create a collector from acquisition settings
    pub fn with_config(config: &AcquisitionConfig) -> Self {
        Self {
            baseline: config.baseline,
            window_size: config.window_size.max(1),
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Read up to `window_size` samples and summarize them.
    ///
    /// A closed channel or a read that exceeds the timeout ends the window
    /// early. Fails with `Timeout` only when no sample arrived at all.
    pub async fn collect(&self, samples: &mut mpsc::Receiver<f32>) -> Result<EmgStats> {
        let mut window = Vec::with_capacity(self.window_size);

        while window.len() < self.window_size {
            match timeout(self.read_timeout, samples.recv()).await {
                Ok(Some(sample)) => window.push(sample),
                Ok(None) => {
                    debug!(collected = window.len(), "Sample stream closed");
                    break;
                }
                Err(_) => {
                    warn!(
                        collected = window.len(),
                        timeout_ms = self.read_timeout.as_millis() as u64,
                        "Sample stream stalled"
                    );
                    break;
                }
            }
        }

        if window.is_empty() {
            return Err(ScreeningError::Timeout {
                duration_ms: self.read_timeout.as_millis() as u64,
            });
        }

        let stats = EmgStats::from_samples(&window, self.baseline);
        debug!(samples = window.len(), pattern = stats.pattern().description(), "EMG window collected");
        Ok(stats)
    }
}

impl Default for EmgWindowCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Run an assessment on tokio's blocking pool.
///
/// A failed blocking task yields the safe default assessment.
pub async fn assess_async(assessor: Arc<RiskAssessor>, request: AssessmentRequest) -> RiskAssessment {
    match tokio::task::spawn_blocking(move || assessor.assess(&request)).await {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!(error = %e, "Assessment task failed");
            RiskAssessment::safe_default(format!("assessment task failed: {}", e))
        }
    }
}
