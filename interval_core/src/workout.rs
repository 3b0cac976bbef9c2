//! Workout configuration: phase durations, round count and presets.
//!
//! A [`WorkoutConfig`] can only be obtained through validation, so every
//! value the engine sees already satisfies `rounds >= 1`. Untrusted input
//! (CLI flags, config files) arrives as a [`RawWorkoutConfig`] with signed
//! fields and is checked by `WorkoutConfig::try_from`.

use crate::{ConfigError, Error, Phase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validated description of a workout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWorkoutConfig", into = "RawWorkoutConfig")]
pub struct WorkoutConfig {
    prep_seconds: u32,
    work_seconds: u32,
    rest_seconds: u32,
    rounds: u32,
    cooldown_seconds: u32,
}

/// Unvalidated workout fields as they appear in files and on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWorkoutConfig {
    pub prep_seconds: i64,
    pub work_seconds: i64,
    pub rest_seconds: i64,
    pub rounds: i64,
    pub cooldown_seconds: i64,
}

impl Default for RawWorkoutConfig {
    fn default() -> Self {
        WorkoutConfig::default().into()
    }
}

impl From<WorkoutConfig> for RawWorkoutConfig {
    fn from(config: WorkoutConfig) -> Self {
        Self {
            prep_seconds: config.prep_seconds.into(),
            work_seconds: config.work_seconds.into(),
            rest_seconds: config.rest_seconds.into(),
            rounds: config.rounds.into(),
            cooldown_seconds: config.cooldown_seconds.into(),
        }
    }
}

impl TryFrom<RawWorkoutConfig> for WorkoutConfig {
    type Error = ConfigError;

    fn try_from(raw: RawWorkoutConfig) -> Result<Self, Self::Error> {
        if raw.rounds < 1 {
            return Err(ConfigError::ZeroRounds(raw.rounds));
        }

        let config = Self {
            prep_seconds: checked_duration("prep_seconds", raw.prep_seconds)?,
            work_seconds: checked_duration("work_seconds", raw.work_seconds)?,
            rest_seconds: checked_duration("rest_seconds", raw.rest_seconds)?,
            rounds: u32::try_from(raw.rounds).map_err(|_| ConfigError::ValueTooLarge {
                field: "rounds",
                value: raw.rounds,
            })?,
            cooldown_seconds: checked_duration("cooldown_seconds", raw.cooldown_seconds)?,
        };
        if config.checked_total().is_none() {
            return Err(ConfigError::TotalTooLarge);
        }
        Ok(config)
    }
}

fn checked_duration(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeDuration { field, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::ValueTooLarge { field, value })
}

impl WorkoutConfig {
    /// Build a config, rejecting negative durations and fewer than one round
    pub fn new(
        prep_seconds: i64,
        work_seconds: i64,
        rest_seconds: i64,
        rounds: i64,
        cooldown_seconds: i64,
    ) -> Result<Self, ConfigError> {
        RawWorkoutConfig {
            prep_seconds,
            work_seconds,
            rest_seconds,
            rounds,
            cooldown_seconds,
        }
        .try_into()
    }

    pub fn prep_seconds(&self) -> u32 {
        self.prep_seconds
    }

    pub fn work_seconds(&self) -> u32 {
        self.work_seconds
    }

    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn cooldown_seconds(&self) -> u32 {
        self.cooldown_seconds
    }

    /// Configured length of a phase; `Done` has none
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Prep => self.prep_seconds,
            Phase::Work => self.work_seconds,
            Phase::Rest => self.rest_seconds,
            Phase::Cooldown => self.cooldown_seconds,
            Phase::Done => 0,
        }
    }

    /// Seconds from start to finish: prep + work*rounds + rest*(rounds-1) + cooldown
    ///
    /// Validation guarantees the sum fits in `u64`.
    pub fn total_duration(&self) -> u64 {
        self.checked_total().unwrap_or(u64::MAX)
    }

    fn checked_total(&self) -> Option<u64> {
        let rounds = u64::from(self.rounds);
        let work = u64::from(self.work_seconds).checked_mul(rounds)?;
        let rest = u64::from(self.rest_seconds).checked_mul(rounds.saturating_sub(1))?;
        u64::from(self.prep_seconds)
            .checked_add(work)?
            .checked_add(rest)?
            .checked_add(u64::from(self.cooldown_seconds))
    }

    /// Apply overrides on top of this config and re-validate
    pub fn with_overrides(&self, overrides: &WorkoutOverrides) -> Result<Self, ConfigError> {
        let mut raw = RawWorkoutConfig::from(*self);
        if let Some(v) = overrides.prep_seconds {
            raw.prep_seconds = v;
        }
        if let Some(v) = overrides.work_seconds {
            raw.work_seconds = v;
        }
        if let Some(v) = overrides.rest_seconds {
            raw.rest_seconds = v;
        }
        if let Some(v) = overrides.rounds {
            raw.rounds = v;
        }
        if let Some(v) = overrides.cooldown_seconds {
            raw.cooldown_seconds = v;
        }
        raw.try_into()
    }

    // Display helpers

    pub fn prep_display(&self) -> String {
        format_duration(self.prep_seconds.into())
    }

    pub fn work_display(&self) -> String {
        format_duration(self.work_seconds.into())
    }

    pub fn rest_display(&self) -> String {
        format_duration(self.rest_seconds.into())
    }

    pub fn rounds_display(&self) -> String {
        self.rounds.to_string()
    }

    pub fn cooldown_display(&self) -> String {
        if self.cooldown_seconds == 0 {
            return "None".to_string();
        }
        format_duration(self.cooldown_seconds.into())
    }

    pub fn total_duration_display(&self) -> String {
        format_duration(self.total_duration())
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Preset::TabataClassic.config()
    }
}

impl fmt::Display for WorkoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prep {} | work {} | rest {} | rounds {} | cooldown {} | total {}",
            self.prep_display(),
            self.work_display(),
            self.rest_display(),
            self.rounds_display(),
            self.cooldown_display(),
            self.total_duration_display()
        )
    }
}

/// Optional per-field replacements, e.g. from command-line flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkoutOverrides {
    pub prep_seconds: Option<i64>,
    pub work_seconds: Option<i64>,
    pub rest_seconds: Option<i64>,
    pub rounds: Option<i64>,
    pub cooldown_seconds: Option<i64>,
}

impl WorkoutOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Format seconds as `"45 s"`, `"2 min"` or `"1:30"`
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{} s", seconds);
    }
    let min = seconds / 60;
    let sec = seconds % 60;
    if sec == 0 {
        return format!("{} min", min);
    }
    format!("{}:{:02}", min, sec)
}

// ============================================================================
// Presets
// ============================================================================

/// Built-in workout templates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    TabataClassic,
    HiitStandard,
    Beginner,
    Advanced,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::TabataClassic,
        Preset::HiitStandard,
        Preset::Beginner,
        Preset::Advanced,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::TabataClassic => "tabata",
            Preset::HiitStandard => "hiit",
            Preset::Beginner => "beginner",
            Preset::Advanced => "advanced",
        }
    }

    pub fn config(&self) -> WorkoutConfig {
        let (prep, work, rest, rounds, cooldown) = match self {
            Preset::TabataClassic => (10, 20, 10, 8, 30),
            Preset::HiitStandard => (10, 40, 20, 6, 60),
            Preset::Beginner => (15, 20, 20, 4, 60),
            Preset::Advanced => (5, 45, 15, 10, 30),
        };
        WorkoutConfig {
            prep_seconds: prep,
            work_seconds: work,
            rest_seconds: rest,
            rounds,
            cooldown_seconds: cooldown,
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tabata" | "tabata_classic" => Ok(Preset::TabataClassic),
            "hiit" | "hiit_standard" => Ok(Preset::HiitStandard),
            "beginner" => Ok(Preset::Beginner),
            "advanced" => Ok(Preset::Advanced),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}
