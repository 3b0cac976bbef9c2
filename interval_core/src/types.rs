//! Core domain types for the interval timer.
//!
//! This module defines the fundamental types shared by the engine and hosts:
//! - Workout phases and run states
//! - Signals emitted by the engine
//! - The observable state snapshot

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Phase and Run State
// ============================================================================

/// One stage of the workout cycle, in the order they are entered
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Prep,
    Work,
    Rest,
    Cooldown,
    Done,
}

impl Phase {
    /// Every phase in cycle order
    pub const ALL: [Phase; 5] = [
        Phase::Prep,
        Phase::Work,
        Phase::Rest,
        Phase::Cooldown,
        Phase::Done,
    ];

    /// Banner text shown while the phase is active
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Prep => "GET READY",
            Phase::Work => "WORK!",
            Phase::Rest => "REST",
            Phase::Cooldown => "COOLDOWN",
            Phase::Done => "COMPLETE!",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lifecycle of the engine; governs which operations take effect
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

// ============================================================================
// Signals and Snapshots
// ============================================================================

/// Signal emitted by the engine for audio/haptic collaborators
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A new phase was entered
    PhaseTransition(Phase),
    /// A tick started with this many seconds left (1 to 3)
    CountdownWarning(u32),
    /// The workout reached `Done`
    WorkoutComplete,
}

/// Observable engine state at a point in time
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub current_round: u32,
    pub run_state: RunState,
}
