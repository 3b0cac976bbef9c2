mod runner;

use clap::{Args, Parser, Subcommand};
use interval_core::*;
use runner::{RunSummary, SimulatedClock, SystemClock, TerminalSink};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "itimer")]
#[command(about = "Interval workout timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout in real time (default)
    Run {
        /// Start from a preset (tabata, hiit, beginner, advanced)
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        workout: WorkoutArgs,

        /// Run on a simulated clock - finishes instantly
        #[arg(long)]
        simulate: bool,
    },

    /// Show the state reached after a block of elapsed seconds
    Simulate {
        /// Seconds to fast-forward
        #[arg(long)]
        elapsed: u64,

        /// Individual ticks to deliver before fast-forwarding
        #[arg(long, default_value_t = 0)]
        ticks: u64,

        /// Start from a preset (tabata, hiit, beginner, advanced)
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        workout: WorkoutArgs,

        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in presets
    Presets,

    /// Manage the saved workout configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the saved configuration
    Show,

    /// Change individual values
    Set {
        #[command(flatten)]
        workout: WorkoutArgs,

        /// Seconds without ticks before a gap counts as a suspension
        #[arg(long)]
        suspend_threshold: Option<u64>,

        /// Print the 3-2-1 countdown at the end of each phase
        #[arg(long)]
        countdown_warnings: Option<bool>,
    },

    /// Replace the workout with a preset
    Preset {
        /// Preset name (tabata, hiit, beginner, advanced)
        name: String,
    },

    /// Restore defaults
    Reset,
}

/// Workout value overrides shared by several commands
#[derive(Args, Clone, Copy, Debug, Default)]
struct WorkoutArgs {
    /// Preparation seconds
    #[arg(long, allow_negative_numbers = true)]
    prep: Option<i64>,

    /// Work seconds per round
    #[arg(long, allow_negative_numbers = true)]
    work: Option<i64>,

    /// Rest seconds between rounds
    #[arg(long, allow_negative_numbers = true)]
    rest: Option<i64>,

    /// Number of rounds
    #[arg(long, allow_negative_numbers = true)]
    rounds: Option<i64>,

    /// Cooldown seconds (0 to skip)
    #[arg(long, allow_negative_numbers = true)]
    cooldown: Option<i64>,
}

impl From<WorkoutArgs> for WorkoutOverrides {
    fn from(args: WorkoutArgs) -> Self {
        Self {
            prep_seconds: args.prep,
            work_seconds: args.work,
            rest_seconds: args.rest,
            rounds: args.rounds,
            cooldown_seconds: args.cooldown,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        interval_core::logging::init_with_level("debug");
    } else {
        interval_core::logging::init();
    }

    match dispatch_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch_command(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let load = || Config::load_or_default(&config_path);

    match cli.command {
        Some(Commands::Run {
            preset,
            workout,
            simulate,
        }) => cmd_run(&load()?, preset.as_deref(), workout, simulate),
        Some(Commands::Simulate {
            elapsed,
            ticks,
            preset,
            workout,
            json,
        }) => cmd_simulate(&load()?, preset.as_deref(), workout, ticks, elapsed, json),
        Some(Commands::Presets) => cmd_presets(),
        // Reset must work even when the saved file is invalid
        Some(Commands::Config {
            action: ConfigAction::Reset,
        }) => cmd_config(&config_path, Config::default(), ConfigAction::Reset),
        Some(Commands::Config { action }) => cmd_config(&config_path, load()?, action),
        None => {
            // Default to "run" command
            cmd_run(&load()?, None, WorkoutArgs::default(), false)
        }
    }
}

/// Saved workout, optionally replaced by a preset, then overridden by flags
fn resolve_workout(
    config: &Config,
    preset: Option<&str>,
    workout: WorkoutArgs,
) -> Result<WorkoutConfig> {
    let base = match preset {
        Some(name) => name.parse::<Preset>()?.config(),
        None => config.workout,
    };
    Ok(base.with_overrides(&workout.into())?)
}

fn cmd_run(
    config: &Config,
    preset: Option<&str>,
    workout: WorkoutArgs,
    simulate: bool,
) -> Result<()> {
    let workout = resolve_workout(config, preset, workout)?;
    let mut engine = PhaseEngine::new(workout);

    println!("Workout: {}", workout);
    let mut sink = TerminalSink::new(std::io::stdout(), config.timer.countdown_warnings);
    if workout.prep_seconds() > 0 {
        sink.banner(Phase::Prep, workout.prep_seconds());
    }

    let threshold = config.timer.suspend_threshold_seconds;
    let summary = if simulate {
        let mut clock = SimulatedClock::new(chrono::Utc::now());
        runner::run(&mut engine, &mut clock, &mut sink, threshold)
    } else {
        let mut clock = SystemClock;
        runner::run(&mut engine, &mut clock, &mut sink, threshold)
    };

    if sink.write_failed() {
        return Ok(());
    }
    display_summary(&summary);
    Ok(())
}

fn cmd_simulate(
    config: &Config,
    preset: Option<&str>,
    workout: WorkoutArgs,
    ticks: u64,
    elapsed: u64,
    json: bool,
) -> Result<()> {
    let workout = resolve_workout(config, preset, workout)?;
    let mut engine = PhaseEngine::new(workout);
    engine.start();
    for _ in 0..ticks {
        engine.tick();
    }
    let events = engine.reconcile(elapsed);
    dispatch(&events, &mut TracingSink);

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        return Ok(());
    }

    println!("Phase:     {}", engine.phase().display_name());
    println!("Remaining: {}", engine.formatted_time());
    println!("Round:     {}", engine.round_display());
    println!("State:     {:?}", engine.run_state());
    Ok(())
}

fn cmd_presets() -> Result<()> {
    for preset in Preset::ALL {
        let workout = preset.config();
        println!("{:<10} {}", preset.name(), workout);
    }
    Ok(())
}

fn cmd_config(path: &Path, mut config: Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", path.display());
            println!("# {}", config.workout);
            print!("{}", config.to_toml()?);
            return Ok(());
        }
        ConfigAction::Set {
            workout,
            suspend_threshold,
            countdown_warnings,
        } => {
            config.workout = config.workout.with_overrides(&workout.into())?;
            if let Some(threshold) = suspend_threshold {
                config.timer.suspend_threshold_seconds = threshold;
            }
            if let Some(enabled) = countdown_warnings {
                config.timer.countdown_warnings = enabled;
            }
        }
        ConfigAction::Preset { name } => {
            config.workout = name.parse::<Preset>()?.config();
        }
        ConfigAction::Reset => {
            config = Config::default();
        }
    }

    config.save_to(path)?;
    println!("✓ Saved {}", path.display());
    println!("  {}", config.workout);
    Ok(())
}

fn display_summary(summary: &RunSummary) {
    println!();
    println!(
        "Finished: {} ticks, {} reconciled after {} suspension(s)",
        summary.ticks, summary.reconciled_seconds, summary.suspensions
    );
}
