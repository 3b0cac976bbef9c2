//! Phase engine driving an interval workout.
//!
//! The engine owns the live state (phase, remaining seconds, round, run
//! state) and advances it in two ways:
//! - `tick()`: one second of running time delivered by the host scheduler
//! - `reconcile()`: a block of seconds that elapsed while the host was
//!   suspended, resolved in one pass bounded by the number of phase
//!   transitions left rather than by the number of seconds
//!
//! Both paths go through the same transition rules, so reconciling `n`
//! seconds always lands on the state that `n` ticks would have produced.
//! The engine never reads the clock and performs no I/O; every operation
//! returns the [`EngineEvent`]s it produced, in emission order.

use crate::{EngineError, EngineEvent, EngineSnapshot, Phase, RunState, WorkoutConfig};
use chrono::{DateTime, Utc};

/// Outcome of leaving a phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Enter `phase` for `seconds`, now on round `round`
    Enter { phase: Phase, seconds: u32, round: u32 },
    /// The workout is over
    Finish,
    /// `Done` is terminal
    Stay,
}

/// Decide what follows `phase` on `round`
///
/// Pure function of its inputs:
/// - Prep → Work
/// - Work → Rest while rounds remain, else Cooldown if configured, else finish
/// - Rest → Work on the next round
/// - Cooldown → finish
pub fn next_step(phase: Phase, round: u32, config: &WorkoutConfig) -> Step {
    match phase {
        Phase::Prep => Step::Enter {
            phase: Phase::Work,
            seconds: config.work_seconds(),
            round,
        },
        Phase::Work => {
            if round < config.rounds() {
                Step::Enter {
                    phase: Phase::Rest,
                    seconds: config.rest_seconds(),
                    round,
                }
            } else if config.cooldown_seconds() > 0 {
                Step::Enter {
                    phase: Phase::Cooldown,
                    seconds: config.cooldown_seconds(),
                    round,
                }
            } else {
                Step::Finish
            }
        }
        Phase::Rest => Step::Enter {
            phase: Phase::Work,
            seconds: config.work_seconds(),
            round: round + 1,
        },
        Phase::Cooldown => Step::Finish,
        Phase::Done => Step::Stay,
    }
}

/// Mark left by `suspend()` until the host reports the matching resume
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Suspension {
    at: DateTime<Utc>,
    remaining: u32,
}

/// Interval workout state machine
#[derive(Clone, Debug)]
pub struct PhaseEngine {
    config: WorkoutConfig,
    phase: Phase,
    remaining_seconds: u32,
    current_round: u32,
    run_state: RunState,
    suspension: Option<Suspension>,
}

impl PhaseEngine {
    /// Create an idle engine positioned at the start of the workout
    pub fn new(config: WorkoutConfig) -> Self {
        Self {
            config,
            phase: Phase::Prep,
            remaining_seconds: config.prep_seconds(),
            current_round: 1,
            run_state: RunState::Idle,
            suspension: None,
        }
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.config.rounds()
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Timestamp recorded by a pending `suspend()`, if any
    pub fn suspended_at(&self) -> Option<DateTime<Utc>> {
        self.suspension.map(|s| s.at)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            current_round: self.current_round,
            run_state: self.run_state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.run_state == RunState::Finished
    }

    pub fn can_start(&self) -> bool {
        matches!(self.run_state, RunState::Idle | RunState::Finished)
    }

    // ------------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------------

    /// Begin the workout from Idle, or restart it from Finished
    ///
    /// No-op while Running or Paused.
    pub fn start(&mut self) -> Vec<EngineEvent> {
        if !self.can_start() {
            return Vec::new();
        }
        if self.run_state == RunState::Finished {
            self.restore_initial();
        }

        self.suspension = None;
        self.run_state = RunState::Running;
        tracing::info!(
            "Workout started: {} rounds, {} seconds total",
            self.config.rounds(),
            self.config.total_duration()
        );

        let mut events = Vec::new();
        self.settle(&mut events);
        events
    }

    /// Freeze the countdown. No-op unless Running.
    pub fn pause(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        self.run_state = RunState::Paused;
        self.suspension = None;
        tracing::info!(
            "Workout paused in {:?} with {}s left",
            self.phase,
            self.remaining_seconds
        );
    }

    /// Continue from the frozen state. No-op unless Paused.
    pub fn resume(&mut self) {
        if self.run_state != RunState::Paused {
            return;
        }
        self.run_state = RunState::Running;
        tracing::info!("Workout resumed");
    }

    /// Return to `(Prep, prep_seconds, round 1, Idle)` from any state
    pub fn reset(&mut self) {
        self.restore_initial();
        self.run_state = RunState::Idle;
        self.suspension = None;
        tracing::info!("Workout reset");
    }

    /// Start, pause or resume depending on the current run state
    pub fn toggle(&mut self) -> Vec<EngineEvent> {
        match self.run_state {
            RunState::Idle | RunState::Finished => self.start(),
            RunState::Running => {
                self.pause();
                Vec::new()
            }
            RunState::Paused => {
                self.resume();
                Vec::new()
            }
        }
    }

    /// Replace the workout configuration; only allowed while Idle
    pub fn update_config(&mut self, config: WorkoutConfig) -> Result<(), EngineError> {
        if self.run_state != RunState::Idle {
            return Err(EngineError::NotIdle(self.run_state));
        }
        self.config = config;
        self.restore_initial();
        tracing::debug!("Workout config updated: {}", self.config);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------------

    /// Advance one second of running time. No-op unless Running.
    ///
    /// Emits `CountdownWarning` when the tick starts with 1 to 3 seconds
    /// left, then any transition the decrement triggers.
    pub fn tick(&mut self) -> Vec<EngineEvent> {
        if self.run_state != RunState::Running {
            return Vec::new();
        }

        let mut events = Vec::new();
        if (1..=3).contains(&self.remaining_seconds) {
            events.push(EngineEvent::CountdownWarning(self.remaining_seconds));
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.transition(&mut events);
        }
        events
    }

    /// Fast-forward `elapsed_seconds` of running time in one pass
    ///
    /// Produces the same state as `elapsed_seconds` calls to `tick()`. Time
    /// left over after the workout finishes is discarded. No-op unless
    /// Running. Countdown warnings are not emitted.
    pub fn reconcile(&mut self, elapsed_seconds: u64) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.run_state != RunState::Running || elapsed_seconds == 0 {
            return events;
        }

        let before = self.snapshot();
        let mut elapsed = elapsed_seconds;

        while self.run_state == RunState::Running {
            let cursor = u64::from(self.remaining_seconds);
            if elapsed < cursor {
                // elapsed < cursor <= u32::MAX
                self.remaining_seconds -= elapsed as u32;
                break;
            }
            elapsed -= cursor;
            self.remaining_seconds = 0;
            self.transition(&mut events);
        }

        tracing::debug!(
            "Reconciled {}s: {:?}/{}s/round {} -> {:?}/{}s/round {}",
            elapsed_seconds,
            before.phase,
            before.remaining_seconds,
            before.current_round,
            self.phase,
            self.remaining_seconds,
            self.current_round
        );
        events
    }

    /// Record that the host stopped delivering ticks at `at`
    ///
    /// No-op unless Running. A second call keeps the first mark.
    pub fn suspend(&mut self, at: DateTime<Utc>) {
        if self.run_state != RunState::Running || self.suspension.is_some() {
            return;
        }
        self.suspension = Some(Suspension {
            at,
            remaining: self.remaining_seconds,
        });
        tracing::debug!("Suspended at {} with {}s left", at, self.remaining_seconds);
    }

    /// Reconcile the whole seconds between the suspension mark and `now`
    ///
    /// No-op without a pending mark. A `now` earlier than the mark counts as
    /// zero elapsed seconds.
    pub fn resume_from_suspend(&mut self, now: DateTime<Utc>) -> Vec<EngineEvent> {
        let Some(suspension) = self.suspension.take() else {
            return Vec::new();
        };

        if self.remaining_seconds != suspension.remaining {
            tracing::warn!(
                "Ticks were delivered while suspended ({}s at mark, {}s now)",
                suspension.remaining,
                self.remaining_seconds
            );
        }

        let elapsed = u64::try_from((now - suspension.at).num_seconds()).unwrap_or(0);
        tracing::info!("Resuming after {}s suspended", elapsed);
        self.reconcile(elapsed)
    }

    // ------------------------------------------------------------------------
    // Display helpers
    // ------------------------------------------------------------------------

    /// Fraction of the current phase already elapsed, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        let total = self.config.duration_of(self.phase);
        if total == 0 {
            return 0.0;
        }
        f64::from(total.saturating_sub(self.remaining_seconds)) / f64::from(total)
    }

    /// Remaining time as `MM:SS`
    pub fn formatted_time(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    pub fn round_display(&self) -> String {
        format!("ROUND {} OF {}", self.current_round, self.config.rounds())
    }

    /// Number of transitions between the current phase and `Done`
    pub fn transitions_remaining(&self) -> u64 {
        let rounds = u64::from(self.config.rounds());
        let round = u64::from(self.current_round);
        let from_last_work = if self.config.cooldown_seconds() > 0 { 2 } else { 1 };
        let from_work = |round: u64| 2 * (rounds - round) + from_last_work;

        match self.phase {
            Phase::Prep => 1 + from_work(round),
            Phase::Work => from_work(round),
            Phase::Rest => 1 + from_work(round + 1),
            Phase::Cooldown => 1,
            Phase::Done => 0,
        }
    }

    /// Running seconds until `Done`
    ///
    /// Never exceeds `total_duration`, so the sum cannot overflow.
    pub fn seconds_left(&self) -> u64 {
        let rounds = u64::from(self.config.rounds());
        let round = u64::from(self.current_round);
        let work = u64::from(self.config.work_seconds());
        let rest = u64::from(self.config.rest_seconds());
        let cooldown = u64::from(self.config.cooldown_seconds());
        // After the work phase of `round` ends
        let after_work = |round: u64| (work + rest) * (rounds - round) + cooldown;

        let remaining = u64::from(self.remaining_seconds);
        match self.phase {
            Phase::Prep => remaining + work + after_work(round),
            Phase::Work => remaining + after_work(round),
            Phase::Rest => remaining + work + after_work(round + 1),
            Phase::Cooldown => remaining,
            Phase::Done => 0,
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn restore_initial(&mut self) {
        self.phase = Phase::Prep;
        self.current_round = 1;
        self.remaining_seconds = self.config.prep_seconds();
    }

    /// Leave the current phase, then skip through any zero-length phases
    fn transition(&mut self, events: &mut Vec<EngineEvent>) {
        self.advance(events);
        self.settle(events);
    }

    /// Resolve `remaining == 0` while Running so it is never observed
    fn settle(&mut self, events: &mut Vec<EngineEvent>) {
        while self.run_state == RunState::Running && self.remaining_seconds == 0 {
            self.advance(events);
        }
    }

    fn advance(&mut self, events: &mut Vec<EngineEvent>) {
        match next_step(self.phase, self.current_round, &self.config) {
            Step::Enter {
                phase,
                seconds,
                round,
            } => {
                tracing::debug!(
                    "Phase {:?} -> {:?} ({}s, round {})",
                    self.phase,
                    phase,
                    seconds,
                    round
                );
                self.phase = phase;
                self.remaining_seconds = seconds;
                self.current_round = round;
                events.push(EngineEvent::PhaseTransition(phase));
            }
            Step::Finish => self.finish(events),
            Step::Stay => {}
        }
    }

    fn finish(&mut self, events: &mut Vec<EngineEvent>) {
        self.phase = Phase::Done;
        self.run_state = RunState::Finished;
        self.remaining_seconds = 0;
        self.suspension = None;
        tracing::info!("Workout complete after {} rounds", self.current_round);
        events.push(EngineEvent::WorkoutComplete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn short_config() -> WorkoutConfig {
        WorkoutConfig::new(2, 2, 2, 2, 2).unwrap()
    }

    fn running_engine(config: WorkoutConfig) -> PhaseEngine {
        let mut engine = PhaseEngine::new(config);
        engine.start();
        engine
    }

    fn tick_n(engine: &mut PhaseEngine, n: u64) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(engine.tick());
        }
        events
    }

    fn done_snapshot(config: &WorkoutConfig) -> EngineSnapshot {
        EngineSnapshot {
            phase: Phase::Done,
            remaining_seconds: 0,
            current_round: config.rounds(),
            run_state: RunState::Finished,
        }
    }

    #[test]
    fn test_initial_state() {
        let engine = PhaseEngine::new(short_config());
        assert_eq!(engine.phase(), Phase::Prep);
        assert_eq!(engine.run_state(), RunState::Idle);
        assert_eq!(engine.current_round(), 1);
        assert_eq!(engine.remaining_seconds(), 2);
        assert!(engine.can_start());
        assert!(!engine.is_running());
        assert!(!engine.is_paused());
    }

    #[test]
    fn test_start() {
        let mut engine = PhaseEngine::new(short_config());
        let events = engine.start();
        assert!(events.is_empty());
        assert!(engine.is_running());
        assert_eq!(engine.phase(), Phase::Prep);
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let mut engine = running_engine(short_config());
        engine.tick();
        let before = engine.snapshot();
        assert!(engine.start().is_empty());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_tick_is_noop_unless_running() {
        let mut engine = PhaseEngine::new(short_config());
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_seconds(), 2);

        engine.start();
        engine.pause();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_seconds(), 2);
    }

    #[test]
    fn test_scenario_ten_ticks() {
        let config = short_config();
        let mut engine = running_engine(config);
        let mut phases = vec![engine.phase()];

        for i in 1..=10 {
            engine.tick();
            if *phases.last().unwrap() != engine.phase() {
                phases.push(engine.phase());
            }
            if i < 10 {
                assert!(engine.is_running(), "finished early at tick {}", i);
            }
        }

        assert_eq!(
            phases,
            vec![
                Phase::Prep,
                Phase::Work,
                Phase::Rest,
                Phase::Work,
                Phase::Cooldown,
                Phase::Done
            ]
        );
        assert_eq!(engine.snapshot(), done_snapshot(&config));
    }

    #[test]
    fn test_tick_then_reconcile_matches_ticks() {
        let config = short_config();
        let mut ticked = running_engine(config);
        tick_n(&mut ticked, 10);

        let mut reconciled = running_engine(config);
        reconciled.tick();
        assert_eq!(reconciled.remaining_seconds(), 1);
        reconciled.reconcile(9);

        assert_eq!(reconciled.snapshot(), ticked.snapshot());
        assert_eq!(reconciled.snapshot(), done_snapshot(&config));
    }

    #[test]
    fn test_events_emitted_by_ticks() {
        let mut engine = running_engine(short_config());
        let events = tick_n(&mut engine, 10);
        assert_eq!(
            events,
            vec![
                EngineEvent::CountdownWarning(2),
                EngineEvent::CountdownWarning(1),
                EngineEvent::PhaseTransition(Phase::Work),
                EngineEvent::CountdownWarning(2),
                EngineEvent::CountdownWarning(1),
                EngineEvent::PhaseTransition(Phase::Rest),
                EngineEvent::CountdownWarning(2),
                EngineEvent::CountdownWarning(1),
                EngineEvent::PhaseTransition(Phase::Work),
                EngineEvent::CountdownWarning(2),
                EngineEvent::CountdownWarning(1),
                EngineEvent::PhaseTransition(Phase::Cooldown),
                EngineEvent::CountdownWarning(2),
                EngineEvent::CountdownWarning(1),
                EngineEvent::WorkoutComplete,
            ]
        );
    }

    #[test]
    fn test_countdown_warning_only_in_last_three_seconds() {
        let config = WorkoutConfig::new(5, 10, 5, 1, 0).unwrap();
        let mut engine = running_engine(config);
        assert!(engine.tick().is_empty()); // 5 -> 4
        assert!(engine.tick().is_empty()); // 4 -> 3
        assert_eq!(engine.tick(), vec![EngineEvent::CountdownWarning(3)]);
    }

    #[test]
    fn test_round_counting_three_rounds() {
        let config = WorkoutConfig::new(1, 1, 1, 3, 1).unwrap();
        let mut engine = running_engine(config);
        let mut sequence = vec![(engine.phase(), engine.current_round())];
        while engine.phase() != Phase::Cooldown {
            engine.tick();
            sequence.push((engine.phase(), engine.current_round()));
        }

        assert_eq!(
            sequence,
            vec![
                (Phase::Prep, 1),
                (Phase::Work, 1),
                (Phase::Rest, 1),
                (Phase::Work, 2),
                (Phase::Rest, 2),
                (Phase::Work, 3),
                (Phase::Cooldown, 3),
            ]
        );
    }

    #[test]
    fn test_last_work_never_goes_to_rest() {
        let config = WorkoutConfig::new(1, 1, 1, 3, 0).unwrap();
        assert_eq!(next_step(Phase::Work, 3, &config), Step::Finish);
        let with_cooldown = WorkoutConfig::new(1, 1, 1, 3, 4).unwrap();
        assert_eq!(
            next_step(Phase::Work, 3, &with_cooldown),
            Step::Enter {
                phase: Phase::Cooldown,
                seconds: 4,
                round: 3
            }
        );
        assert_eq!(next_step(Phase::Done, 3, &config), Step::Stay);
    }

    #[test]
    fn test_no_cooldown_skips_to_finish() {
        let config = WorkoutConfig::new(1, 2, 1, 1, 0).unwrap();
        let mut engine = running_engine(config);
        let events = tick_n(&mut engine, 3);
        assert!(!events.contains(&EngineEvent::PhaseTransition(Phase::Cooldown)));
        assert_eq!(events.last(), Some(&EngineEvent::WorkoutComplete));
        assert_eq!(engine.snapshot(), done_snapshot(&config));
    }

    #[test]
    fn test_pause_resume_preserves_state() {
        let mut engine = running_engine(short_config());
        tick_n(&mut engine, 3);
        let before = engine.snapshot();

        engine.pause();
        assert!(engine.is_paused());
        engine.resume();
        assert!(engine.is_running());

        let after = engine.snapshot();
        assert_eq!(after.phase, before.phase);
        assert_eq!(after.remaining_seconds, before.remaining_seconds);
        assert_eq!(after.current_round, before.current_round);
    }

    #[test]
    fn test_pause_and_resume_are_noops_in_wrong_state() {
        let mut engine = PhaseEngine::new(short_config());
        engine.pause();
        assert_eq!(engine.run_state(), RunState::Idle);
        engine.resume();
        assert_eq!(engine.run_state(), RunState::Idle);

        engine.start();
        engine.resume();
        assert_eq!(engine.run_state(), RunState::Running);
    }

    #[test]
    fn test_reset_from_every_state() {
        let config = short_config();
        let initial = EngineSnapshot {
            phase: Phase::Prep,
            remaining_seconds: 2,
            current_round: 1,
            run_state: RunState::Idle,
        };

        let mut idle = PhaseEngine::new(config);
        idle.reset();
        assert_eq!(idle.snapshot(), initial);

        let mut running = running_engine(config);
        tick_n(&mut running, 5);
        running.reset();
        assert_eq!(running.snapshot(), initial);

        let mut paused = running_engine(config);
        tick_n(&mut paused, 7);
        paused.pause();
        paused.reset();
        assert_eq!(paused.snapshot(), initial);

        let mut finished = running_engine(config);
        tick_n(&mut finished, 10);
        assert!(finished.is_finished());
        finished.reset();
        assert_eq!(finished.snapshot(), initial);
    }

    #[test]
    fn test_restart_after_finish() {
        let config = short_config();
        let mut engine = running_engine(config);
        tick_n(&mut engine, 10);
        assert!(engine.can_start());

        engine.start();
        assert_eq!(
            engine.snapshot(),
            EngineSnapshot {
                phase: Phase::Prep,
                remaining_seconds: 2,
                current_round: 1,
                run_state: RunState::Running,
            }
        );
    }

    #[test]
    fn test_toggle_dispatch() {
        let mut engine = PhaseEngine::new(short_config());
        engine.toggle();
        assert_eq!(engine.run_state(), RunState::Running);
        engine.toggle();
        assert_eq!(engine.run_state(), RunState::Paused);
        engine.toggle();
        assert_eq!(engine.run_state(), RunState::Running);
    }

    #[test]
    fn test_reconcile_noops() {
        let mut idle = PhaseEngine::new(short_config());
        assert!(idle.reconcile(5).is_empty());
        assert_eq!(idle.remaining_seconds(), 2);

        let mut paused = running_engine(short_config());
        paused.pause();
        paused.reconcile(5);
        assert_eq!(paused.remaining_seconds(), 2);
        assert_eq!(paused.phase(), Phase::Prep);

        let mut running = running_engine(short_config());
        let before = running.snapshot();
        assert!(running.reconcile(0).is_empty());
        assert_eq!(running.snapshot(), before);
    }

    #[test]
    fn test_reconcile_within_phase() {
        let config = WorkoutConfig::new(10, 20, 10, 8, 30).unwrap();
        let mut engine = running_engine(config);
        assert!(engine.reconcile(4).is_empty());
        assert_eq!(engine.phase(), Phase::Prep);
        assert_eq!(engine.remaining_seconds(), 6);
    }

    #[test]
    fn test_reconcile_huge_elapsed_finishes() {
        let config = WorkoutConfig::default();
        let mut engine = running_engine(config);
        let expected = engine.transitions_remaining();
        assert_eq!(expected, 2 * u64::from(config.rounds()) + 1);

        let events = engine.reconcile(u64::MAX);
        assert_eq!(events.len() as u64, expected);
        assert_eq!(events.last(), Some(&EngineEvent::WorkoutComplete));
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineEvent::CountdownWarning(_))));
        assert_eq!(engine.snapshot(), done_snapshot(&config));
    }

    #[test]
    fn test_zero_length_phases_consume_no_ticks() {
        let config = WorkoutConfig::new(0, 3, 0, 2, 0).unwrap();
        let mut engine = PhaseEngine::new(config);
        let events = engine.start();
        assert_eq!(events, vec![EngineEvent::PhaseTransition(Phase::Work)]);
        assert_eq!(engine.remaining_seconds(), 3);

        let events = tick_n(&mut engine, 3);
        assert!(events.contains(&EngineEvent::PhaseTransition(Phase::Rest)));
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.current_round(), 2);
        assert_eq!(engine.remaining_seconds(), 3);

        tick_n(&mut engine, 3);
        assert_eq!(engine.snapshot(), done_snapshot(&config));
        assert_eq!(config.total_duration(), 6);
    }

    #[test]
    fn test_all_zero_config_finishes_on_start() {
        let config = WorkoutConfig::new(0, 0, 0, 3, 0).unwrap();
        let mut engine = PhaseEngine::new(config);
        let events = engine.start();
        assert_eq!(events.last(), Some(&EngineEvent::WorkoutComplete));
        assert_eq!(engine.snapshot(), done_snapshot(&config));
    }

    #[test]
    fn test_suspend_and_resume_from_suspend() {
        let config = short_config();
        let t0 = Utc::now();

        let mut engine = running_engine(config);
        engine.tick();
        engine.suspend(t0);
        assert_eq!(engine.suspended_at(), Some(t0));

        // Sub-second remainder is dropped
        let events = engine.resume_from_suspend(t0 + Duration::milliseconds(4_900));
        assert_eq!(engine.suspended_at(), None);
        assert_eq!(
            events,
            vec![
                EngineEvent::PhaseTransition(Phase::Work),
                EngineEvent::PhaseTransition(Phase::Rest),
            ]
        );

        let mut ticked = running_engine(config);
        tick_n(&mut ticked, 5);
        assert_eq!(engine.snapshot(), ticked.snapshot());
    }

    #[test]
    fn test_suspend_rules() {
        let t0 = Utc::now();
        let mut idle = PhaseEngine::new(short_config());
        idle.suspend(t0);
        assert_eq!(idle.suspended_at(), None);
        assert!(idle.resume_from_suspend(t0).is_empty());

        let mut engine = running_engine(short_config());
        engine.suspend(t0);
        engine.suspend(t0 + Duration::seconds(30));
        assert_eq!(engine.suspended_at(), Some(t0));

        // Clock going backwards counts as no time at all
        let before = engine.snapshot();
        engine.resume_from_suspend(t0 - Duration::seconds(10));
        assert_eq!(engine.snapshot(), before);

        engine.suspend(t0);
        engine.pause();
        assert_eq!(engine.suspended_at(), None);
    }

    #[test]
    fn test_ticks_during_suspension_are_kept() {
        let t0 = Utc::now();
        let config = WorkoutConfig::new(10, 20, 10, 8, 30).unwrap();
        let mut engine = running_engine(config);
        engine.suspend(t0);

        // Host broke the contract; reconcile continues from the live cursor
        tick_n(&mut engine, 2);
        engine.resume_from_suspend(t0 + Duration::seconds(5));

        assert_eq!(engine.phase(), Phase::Prep);
        assert_eq!(engine.remaining_seconds(), 3);
        assert_eq!(engine.suspended_at(), None);
    }

    #[test]
    fn test_u32_max_durations() {
        let max = i64::from(u32::MAX);
        let config = WorkoutConfig::new(max, max, max, 2, max).unwrap();
        let mut engine = PhaseEngine::new(config);
        assert_eq!(engine.formatted_time(), "71582788:15");
        assert_eq!(engine.transitions_remaining(), 5);

        assert!(engine.start().is_empty());
        engine.reconcile(u64::from(u32::MAX) - 1);
        assert_eq!(engine.phase(), Phase::Prep);
        assert_eq!(engine.remaining_seconds(), 1);
        assert!(engine.progress() > 0.99);

        let events = engine.reconcile(u64::MAX);
        assert_eq!(events.len(), 5);
        assert_eq!(engine.snapshot(), done_snapshot(&config));
    }

    #[test]
    fn test_transitions_remaining_with_max_rounds() {
        let config = WorkoutConfig::new(1, 1, 1, i64::from(u32::MAX), 1).unwrap();
        let engine = PhaseEngine::new(config);
        assert_eq!(
            engine.transitions_remaining(),
            2 * u64::from(u32::MAX) + 1
        );
    }

    #[test]
    fn test_update_config_only_while_idle() {
        let mut engine = PhaseEngine::new(short_config());
        let longer = WorkoutConfig::new(15, 30, 10, 4, 0).unwrap();
        engine.update_config(longer).unwrap();
        assert_eq!(engine.remaining_seconds(), 15);
        assert_eq!(engine.total_rounds(), 4);

        engine.start();
        assert_eq!(
            engine.update_config(short_config()),
            Err(EngineError::NotIdle(RunState::Running))
        );
        assert_eq!(engine.config(), &longer);
    }

    #[test]
    fn test_display_helpers() {
        let config = WorkoutConfig::new(125, 20, 10, 2, 0).unwrap();
        let mut engine = PhaseEngine::new(config);
        assert_eq!(engine.formatted_time(), "02:05");
        assert_eq!(engine.round_display(), "ROUND 1 OF 2");
        assert_eq!(engine.progress(), 0.0);

        engine.start();
        engine.reconcile(25);
        assert_eq!(engine.remaining_seconds(), 100);
        assert!((engine.progress() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_seconds_left_counts_down_with_ticks() {
        let config = WorkoutConfig::new(3, 4, 2, 3, 5).unwrap();
        let total = config.total_duration();
        let mut engine = PhaseEngine::new(config);
        assert_eq!(engine.seconds_left(), total);

        engine.start();
        for elapsed in 0..total {
            assert_eq!(engine.seconds_left(), total - elapsed);
            engine.tick();
        }
        assert!(engine.is_finished());
        assert_eq!(engine.seconds_left(), 0);
    }

    #[test]
    fn test_transitions_remaining_counts_down() {
        let config = WorkoutConfig::new(1, 1, 1, 3, 1).unwrap();
        let mut engine = running_engine(config);
        let mut expected = engine.transitions_remaining();
        while engine.is_running() {
            let transitions = engine
                .tick()
                .into_iter()
                .filter(|e| !matches!(e, EngineEvent::CountdownWarning(_)))
                .count() as u64;
            expected -= transitions;
            assert_eq!(engine.transitions_remaining(), expected);
        }
        assert_eq!(expected, 0);
    }
}
