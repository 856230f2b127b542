//! Santa Claus configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::WorkshopError;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Actor population
    pub workshop: WorkshopConfig,

    /// Work and vacation delays
    pub pacing: PacingConfig,

    /// Console narration
    pub narration: NarrationConfig,
}

impl Config {
    /// Validate configuration before any resource is allocated
    pub fn validate(&self) -> Result<(), WorkshopError> {
        self.workshop.validate()
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .santaclaus.yml
        let local_config = PathBuf::from(".santaclaus.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/santaclaus/santaclaus.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("santaclaus").join("santaclaus.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Actor population
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopConfig {
    /// Number of elf actors
    pub elves: usize,

    /// Elves that must gather before Santa helps any of them
    #[serde(rename = "elves-per-group")]
    pub elves_per_group: usize,

    /// Number of reindeer; all of them must return before the sleigh leaves
    pub reindeer: usize,
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            elves: 9,
            elves_per_group: 3,
            reindeer: 10,
        }
    }
}

impl WorkshopConfig {
    pub fn validate(&self) -> Result<(), WorkshopError> {
        if self.elves_per_group == 0 {
            return Err(WorkshopError::Setup("elves-per-group must be at least 1".to_string()));
        }
        if self.elves > 0 && self.elves < self.elves_per_group {
            return Err(WorkshopError::Setup(format!(
                "{} elves can never form a group of {}",
                self.elves, self.elves_per_group
            )));
        }
        Ok(())
    }
}

/// Work and vacation delays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Upper bound of one elf work spell in milliseconds
    #[serde(rename = "max-work-ms")]
    pub max_work_ms: u64,

    /// Upper bound of a reindeer vacation in milliseconds
    #[serde(rename = "max-vacation-ms")]
    pub max_vacation_ms: u64,

    /// Fixed seed for reproducible delays
    pub seed: Option<u64>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            max_work_ms: 40,
            max_vacation_ms: 400,
            seed: None,
        }
    }
}

impl PacingConfig {
    pub fn max_work(&self) -> Duration {
        Duration::from_millis(self.max_work_ms)
    }

    pub fn max_vacation(&self) -> Duration {
        Duration::from_millis(self.max_vacation_ms)
    }
}

/// Narration output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for NarrationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for NarrationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Console narration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    pub format: NarrationFormat,

    /// Colorize text output
    pub color: bool,

    /// Event bus capacity
    #[serde(rename = "channel-capacity")]
    pub channel_capacity: usize,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            format: NarrationFormat::Text,
            color: true,
            channel_capacity: crate::events::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
