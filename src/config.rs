//! Pipeline settings loaded from a TOML file.
//!
//! All values are fixed for a pipeline's lifetime once it is registered;
//! changing them means unregistering and registering a new instance.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors while loading, saving or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration surface of the fusion pipeline
///
/// # Tuning Notes
///
/// - `window_capacity`: larger windows smooth harder but delay orientation
///   changes by roughly `window_capacity * sampling_period_ms`
/// - `timing_ring_capacity`: how many inter-arrival deltas feed one jitter
///   summary; purely diagnostic
/// - `sampling_period_ms`: hint describing the hardware rate, used by the
///   simulated source and for log context, never enforced on intake
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Coordinates per averaging window (must be at least 1)
    pub window_capacity: usize,

    /// Inter-arrival deltas per jitter summary
    pub timing_ring_capacity: usize,

    /// Hardware sampling period hint in milliseconds
    pub sampling_period_ms: u64,

    /// Buffer depth of the raw-sample intake channel
    pub intake_buffer: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_capacity: 20, // ~0.4 s of smoothing at 50 Hz
            timing_ring_capacity: 1000,
            sampling_period_ms: 20, // 50 Hz, common platform default
            intake_buffer: 1000,
        }
    }
}

impl PipelineSettings {
    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::Invalid(
                "window_capacity must be at least 1".to_string(),
            ));
        }
        if self.timing_ring_capacity < 2 {
            return Err(ConfigError::Invalid(
                "timing_ring_capacity must be at least 2".to_string(),
            ));
        }
        if self.intake_buffer == 0 {
            return Err(ConfigError::Invalid(
                "intake_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Default config file location under the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bubblesense")
            .join("config.toml")
    }

    /// Loads settings from the given path, or the default location.
    ///
    /// A missing file yields defaults; a present but malformed file is an
    /// error rather than a silent fallback.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        debug!("Loading settings from {:?}", path);
        let raw = fs::read_to_string(&path)?;
        let settings: Self = toml::from_str(&raw)?;
        settings.validate()?;

        info!(
            "Loaded settings: window {}, ring {}, period {} ms",
            settings.window_capacity, settings.timing_ring_capacity, settings.sampling_period_ms
        );
        Ok(settings)
    }

    /// Writes the settings to the given path, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}
