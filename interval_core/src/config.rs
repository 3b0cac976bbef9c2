//! Configuration file support for the interval timer.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/interval-timer/config.toml`.

use crate::{Error, RawWorkoutConfig, Result, WorkoutConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub timer: TimerConfig,
}

/// Host scheduler configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimerConfig {
    /// Gap between ticks, in seconds, above which the host treats the
    /// time as a suspension and reconciles instead of ticking
    #[serde(default = "default_suspend_threshold_seconds")]
    pub suspend_threshold_seconds: u64,

    /// Print countdown warnings for the last seconds of each phase
    #[serde(default = "default_countdown_warnings")]
    pub countdown_warnings: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            suspend_threshold_seconds: default_suspend_threshold_seconds(),
            countdown_warnings: default_countdown_warnings(),
        }
    }
}

/// On-disk layout; the workout section is validated after parsing so
/// invariant violations surface as `Error::Config`
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    workout: RawWorkoutConfig,

    #[serde(default)]
    timer: TimerConfig,
}

impl TryFrom<ConfigFile> for Config {
    type Error = Error;

    fn try_from(file: ConfigFile) -> Result<Self> {
        Ok(Self {
            workout: WorkoutConfig::try_from(file.workout)?,
            timer: file.timer,
        })
    }
}

// Default value functions
fn default_suspend_threshold_seconds() -> u64 {
    2
}

fn default_countdown_warnings() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::default_config_path())
    }

    /// Load configuration from `path`
    ///
    /// Returns defaults if the file doesn't exist.
    /// If the file is unreadable or not valid TOML, logs a warning and returns
    /// defaults. A well-formed file with invalid workout values is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        match Self::load_from(path) {
            Ok(config) => Ok(config),
            Err(e @ Error::Config(_)) => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Failed to load config file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let file: ConfigFile = crate::store::load_toml(path)?;
        let config = Config::try_from(file)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("interval-timer").join("config.toml")
    }

    /// Render as the TOML written by `save_to`
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        crate::store::save_toml(self, path)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
