//! Viewer configuration.
//!
//! Parsed from an optional YAML file; every field has a default so an absent
//! file behaves like an empty one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Table loaded at startup when present
    #[serde(default = "default_summary")]
    pub default_summary: String,

    /// Preload `default_summary` on startup if the file exists
    #[serde(default = "default_true")]
    pub preload_default_summary: bool,

    /// Rows between "rows processed" status updates
    #[serde(default = "default_progress_every_rows")]
    pub progress_every_rows: usize,

    /// Initial viewer window size
    #[serde(default)]
    pub window: WindowConfig,
}

/// Viewer window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_summary: default_summary(),
            preload_default_summary: true,
            progress_every_rows: default_progress_every_rows(),
            window: WindowConfig::default(),
        }
    }
}

fn default_summary() -> String {
    "data/cohort_calls.csv".to_string()
}

fn default_true() -> bool {
    true
}

fn default_progress_every_rows() -> usize {
    500
}

fn default_width() -> f32 {
    1200.0
}

fn default_height() -> f32 {
    800.0
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_yaml(p),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.progress_every_rows == 0 {
            anyhow::bail!("progress_every_rows must be greater than 0");
        }
        if !(self.window.width > 0.0 && self.window.height > 0.0) {
            anyhow::bail!(
                "Window size must be positive, got {}x{}",
                self.window.width,
                self.window.height
            );
        }
        Ok(())
    }

    /// The default summary table, if preloading is enabled and it exists.
    pub fn preload_path(&self) -> Option<&Path> {
        let p = Path::new(&self.default_summary);
        (self.preload_default_summary && p.is_file()).then_some(p)
    }
}
