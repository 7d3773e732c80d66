use anyhow::{Context, Result};
use crate::features::DEFAULT_BASELINE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the user's home that holds config and stored assessments
const APP_DIR: &str = ".neuroscreen";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub defaults: PatientDefaults,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Location of the probability model artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Safetensors file holding the model; `None` runs fallback-only
    pub path: Option<PathBuf>,
}

/// Values used when the profile collaborator has no age or duration on record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientDefaults {
    /// Age in years
    pub age: f32,

    /// Years since diabetes diagnosis
    pub diabetes_duration_years: f32,
}

impl Default for PatientDefaults {
    fn default() -> Self {
        Self {
            age: 50.0,
            diabetes_duration_years: 5.0,
        }
    }
}

/// EMG acquisition window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Baseline used to count signal crossings
    pub baseline: f32,

    /// Samples per analysis window
    pub window_size: usize,

    /// Maximum wait for a single sample before the window is closed
    pub read_timeout_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            window_size: 100,
            read_timeout_ms: 2_000,
        }
    }
}

/// Where completed assessments are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory; defaults to `~/.neuroscreen/assessments`
    pub dir: Option<PathBuf>,

    /// Oldest records beyond this count are pruned
    pub max_records: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_records: 500,
        }
    }
}

impl StorageConfig {
    /// Resolve the storage directory, falling back to the home directory layout
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("assessments"),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(APP_DIR).join("config.toml"))
    }

    /// Reject values that would make acquisition or scoring meaningless
    pub fn validate(&self) -> Result<()> {
        if self.acquisition.window_size == 0 {
            anyhow::bail!("acquisition.window_size must be at least 1");
        }
        if !self.acquisition.baseline.is_finite() {
            anyhow::bail!("acquisition.baseline must be a finite number");
        }
        if !(self.defaults.age.is_finite() && self.defaults.age >= 0.0) {
            anyhow::bail!("defaults.age must be a non-negative number");
        }
        if !(self.defaults.diabetes_duration_years.is_finite()
            && self.defaults.diabetes_duration_years >= 0.0)
        {
            anyhow::bail!("defaults.diabetes_duration_years must be a non-negative number");
        }
        Ok(())
    }
}
