//! Error types for the interval_core library.

use crate::RunState;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection of a workout configuration at construction time
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A phase duration was below zero
    #[error("{field} must not be negative (got {value})")]
    NegativeDuration { field: &'static str, value: i64 },

    /// Round count was below one
    #[error("rounds must be at least 1 (got {0})")]
    ZeroRounds(i64),

    /// A value does not fit the stored width
    #[error("{field} is too large (got {value})")]
    ValueTooLarge { field: &'static str, value: i64 },

    /// Fields fit individually but the workout length does not fit in seconds
    #[error("total workout length is too large to count in seconds")]
    TotalTooLarge,
}

/// Operation refused by the phase engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Configuration can only be swapped while the engine is idle
    #[error("configuration can only change while idle (engine is {0:?})")]
    NotIdle(RunState),
}

/// Core error type for interval_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Workout configuration validation error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Phase engine refused an operation
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Preset lookup failed
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
