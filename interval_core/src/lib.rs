#![forbid(unsafe_code)]

//! Core domain model and timing logic for the interval timer.
//!
//! This crate provides:
//! - Domain types (phases, run states, engine signals)
//! - Workout configuration and presets
//! - Phase engine with wall-clock reconciliation
//! - Event sinks for audio/haptic collaborators
//! - Configuration persistence

pub mod types;
pub mod error;
pub mod workout;
pub mod engine;
pub mod events;
pub mod config;
pub mod store;
pub mod logging;

// Re-export commonly used types
pub use error::{ConfigError, EngineError, Error, Result};
pub use types::*;
pub use workout::{format_duration, Preset, RawWorkoutConfig, WorkoutConfig, WorkoutOverrides};
pub use engine::{next_step, PhaseEngine, Step};
pub use events::{dispatch, EventSink, TracingSink};
pub use config::{Config, TimerConfig};
