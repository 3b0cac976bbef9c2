//! One-second scheduler that drives a phase engine against a clock.
//!
//! The runner owns all wall-clock reads. When the gap since the last
//! delivered tick grows beyond the suspend threshold (laptop lid closed,
//! process stopped), it stops ticking, marks the suspension at the last
//! tick and lets the engine reconcile the whole seconds that passed.

use chrono::{DateTime, Duration, Utc};
use interval_core::{dispatch, EngineEvent, EventSink, Phase, PhaseEngine};
use std::io::{self, Write};

/// Source of wall-clock time for the scheduler
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&mut self, duration: Duration);
}

/// Real time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&mut self, duration: Duration) {
        if let Ok(d) = duration.to_std() {
            std::thread::sleep(d);
        }
    }
}

/// Virtual time that advances only when slept on
#[derive(Clone, Debug)]
pub struct SimulatedClock {
    now: DateTime<Utc>,
    sleeps: usize,
    stall: Option<(usize, Duration)>,
}

impl SimulatedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: start,
            sleeps: 0,
            stall: None,
        }
    }

    /// Make sleep number `after_sleeps` (counting from 1) overshoot by `extra`
    pub fn stall_after(mut self, after_sleeps: usize, extra: Duration) -> Self {
        self.stall = Some((after_sleeps, extra));
        self
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps += 1;
        self.now += duration;
        if let Some((at, extra)) = self.stall {
            if at == self.sleeps {
                self.now += extra;
            }
        }
    }
}

/// What happened during a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub suspensions: u32,
    /// Workout seconds covered by reconciliation; time past the end is not counted
    pub reconciled_seconds: u64,
}

/// Tick `engine` once per second until it stops running
///
/// Gaps longer than `suspend_threshold_seconds` are reconciled instead of
/// ticked.
pub fn run<C: Clock, S: EventSink + ?Sized>(
    engine: &mut PhaseEngine,
    clock: &mut C,
    sink: &mut S,
    suspend_threshold_seconds: u64,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let one_second = Duration::seconds(1);

    let events = engine.start();
    dispatch(&events, sink);
    let mut last_tick = clock.now();

    while engine.is_running() {
        let deadline = last_tick + one_second;
        let now = clock.now();
        if deadline > now {
            clock.sleep(deadline - now);
        }

        let now = clock.now();
        let gap = (now - last_tick).num_seconds();
        let gap = u64::try_from(gap).unwrap_or(0);

        if gap > suspend_threshold_seconds {
            tracing::info!("Detected {}s without ticks, reconciling", gap);
            let left = engine.seconds_left();
            engine.suspend(last_tick);
            let events = engine.resume_from_suspend(now);
            dispatch(&events, sink);

            summary.suspensions += 1;
            summary.reconciled_seconds += gap.min(left);
            // Keep the sub-second remainder for the next deadline
            last_tick += Duration::seconds(gap as i64);
        } else {
            let events = engine.tick();
            dispatch(&events, sink);
            summary.ticks += 1;
            last_tick = deadline;
        }
    }

    tracing::debug!(
        "Run ended: {} ticks, {} suspensions, {}s reconciled",
        summary.ticks,
        summary.suspensions,
        summary.reconciled_seconds
    );
    summary
}

/// Prints engine signals as terminal lines
///
/// Output errors never stop the workout; the first one is logged.
pub struct TerminalSink<W: Write> {
    out: W,
    countdown_warnings: bool,
    write_failed: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, countdown_warnings: bool) -> Self {
        Self {
            out,
            countdown_warnings,
            write_failed: false,
        }
    }

    /// Announce the phase the workout begins in
    pub fn banner(&mut self, phase: Phase, seconds: u32) {
        let result = writeln!(self.out, "==> {} ({}s)", phase.display_name(), seconds);
        self.check(result);
    }

    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    fn check(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if !self.write_failed {
                tracing::warn!("Failed to write workout output: {}", e);
            }
            self.write_failed = true;
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for TerminalSink<W> {
    fn emit(&mut self, event: &EngineEvent) {
        let result = match event {
            EngineEvent::PhaseTransition(phase) => {
                writeln!(self.out, "==> {}", phase.display_name())
            }
            EngineEvent::CountdownWarning(seconds) if self.countdown_warnings => {
                writeln!(self.out, "    {}...", seconds)
            }
            EngineEvent::CountdownWarning(_) => Ok(()),
            EngineEvent::WorkoutComplete => writeln!(self.out, "✓ Workout complete!"),
        };
        let result = result.and_then(|()| self.out.flush());
        self.check(result);
    }
}
