//! Assessment history storage
//!
//! Completed assessments are handed to an `AssessmentStore`. The bundled
//! `JsonFileStore` keeps one pretty-printed JSON file per record and prunes
//! the oldest records beyond a configured count.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assessment::{AssessmentRequest, RiskAssessment};
use crate::config::StorageConfig;
use crate::errors::Result;
use crate::scoring::RiskLevel;

const RECORD_PREFIX: &str = "assessment_";
const RECORD_SUFFIX: &str = ".json";

/// Stored outcome of one screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    /// Unique record id
    pub id: Uuid,

    /// When the assessment completed
    pub recorded_at: DateTime<Utc>,

    /// Fasting glucose in mg/dL
    pub glucose: f32,

    pub has_temperature_sensation: bool,

    pub has_pressure_sensation: bool,

    /// Probability in `[0, 1]`
    pub score: f32,

    pub risk_level: RiskLevel,

    pub recommendations: BTreeMap<String, String>,

    /// Whether the learned model produced the score
    pub used_model: bool,
}

impl AssessmentRecord {
    /// Capture an assessment and the inputs it was computed from
    pub fn from_assessment(request: &AssessmentRequest, assessment: &RiskAssessment) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            glucose: request.glucose,
            has_temperature_sensation: request.has_temperature_sensation,
            has_pressure_sensation: request.has_pressure_sensation,
            score: assessment.score(),
            risk_level: assessment.risk_level(),
            recommendations: assessment.recommendations().clone(),
            used_model: assessment.used_model(),
        }
    }
}

/// Destination for completed assessments
pub trait AssessmentStore: Send + Sync {
    /// Persist a record
    fn save(&self, record: &AssessmentRecord) -> Result<()>;

    /// All stored records, oldest first
    fn list(&self) -> Result<Vec<AssessmentRecord>>;
}

/// One JSON file per record in a storage directory
pub struct JsonFileStore {
    dir: PathBuf,
    max_records: usize,
}

impl JsonFileStore {
    /// Open a store in `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>, max_records: usize) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create assessment directory {}", dir.display())
            })?;
        }

        Ok(Self { dir, max_records })
    }

    /// Open the store described by the storage configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::new(config.resolved_dir(), config.max_records)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", RECORD_PREFIX, id, RECORD_SUFFIX))
    }

    /// Load a single record by id
    pub fn load(&self, id: &Uuid) -> Result<AssessmentRecord> {
        let path = self.record_path(id);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read assessment file {}", path.display()))?;

        let record = serde_json::from_str(&json).context("Failed to deserialize assessment")?;
        Ok(record)
    }

    /// Delete a record; missing records are ignored
    pub fn delete(&self, id: &Uuid) -> Result<()> {
        let path = self.record_path(id);
        if path.exists() {
            fs::remove_file(&path).context("Failed to delete assessment file")?;
        }
        Ok(())
    }

    /// Ids of every record file in the directory
    fn record_ids(&self) -> Result<Vec<Uuid>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let id = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RECORD_PREFIX))
                .and_then(|n| n.strip_suffix(RECORD_SUFFIX))
                .and_then(|n| Uuid::parse_str(n).ok());

            if let Some(id) = id {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Keep only the newest `max_records` records. `keep` is never pruned,
    /// so a just-saved record survives even with the oldest timestamp.
    fn prune(&self, keep: &Uuid) -> Result<()> {
        let records = self.list()?;
        if records.len() <= self.max_records {
            return Ok(());
        }

        let excess = records.len() - self.max_records;
        let doomed: Vec<&AssessmentRecord> = records
            .iter()
            .filter(|r| &r.id != keep)
            .take(excess)
            .collect();

        for record in &doomed {
            if let Err(e) = self.delete(&record.id) {
                warn!(id = %record.id, error = %e, "Failed to prune assessment");
            }
        }
        debug!(pruned = doomed.len(), "Pruned old assessments");
        Ok(())
    }
}

impl AssessmentStore for JsonFileStore {
    fn save(&self, record: &AssessmentRecord) -> Result<()> {
        let path = self.record_path(&record.id);

        let json = serde_json::to_string_pretty(record).context("Failed to serialize assessment")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write assessment file {}", path.display()))?;

        debug!(id = %record.id, path = %path.display(), "Assessment saved");
        self.prune(&record.id)
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for id in self.record_ids()? {
            match self.load(&id) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%id, error = %e, "Skipping unreadable assessment"),
            }
        }

        records.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }
}
