//! animblock demo
//!
//! Runs an animation block scenario without a window and prints the animated
//! properties frame by frame.
//!
//! ```text
//! animblock-demo bounce
//! animblock-demo scatter --count 5 --duration 800
//! animblock-demo chain --realtime --config animblock.toml
//! ```

mod runner;
mod scenarios;

use animblock::{AnimationScheduler, ManualClock, SchedulerConfig, SystemClock};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use runner::FrameSource;
use scenarios::Scenario;

/// Run animation block scenarios headlessly
#[derive(Parser, Debug)]
#[command(name = "animblock-demo")]
#[command(about = "Run animation block scenarios and print values per frame")]
#[command(version)]
struct Args {
    /// Scenario to run
    #[arg(value_enum, default_value = "bounce")]
    scenario: Scenario,

    /// Duration of each leg in milliseconds
    #[arg(short, long, default_value = "2000")]
    duration: u32,

    /// Number of objects for the scatter scenario
    #[arg(long, default_value = "3")]
    count: usize,

    /// Scheduler config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Drive frames from the wall clock instead of a simulated one
    #[arg(long)]
    realtime: bool,

    /// Print every Nth frame
    #[arg(long, default_value = "10")]
    print_every: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SchedulerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SchedulerConfig::default(),
    };
    if let Some(fps) = args.fps {
        config = config.with_target_fps(fps.max(1));
    }

    let (mut scheduler, source) = if args.realtime {
        let scheduler = AnimationScheduler::with_clock(SystemClock::new()).with_config(config);
        (scheduler, FrameSource::Realtime)
    } else {
        let clock = ManualClock::new();
        let scheduler = AnimationScheduler::with_clock(clock.clone()).with_config(config);
        (scheduler, FrameSource::Simulated(clock))
    };

    tracing::info!(
        scenario = ?args.scenario,
        duration_ms = args.duration,
        fps = scheduler.config().target_fps,
        realtime = args.realtime,
        "Starting scenario"
    );

    let watched = args
        .scenario
        .setup(&mut scheduler, args.duration, args.count)
        .context("Failed to set up scenario")?;

    let frames = runner::run(&mut scheduler, &source, &watched, args.print_every);
    tracing::info!(frames, "Scenario finished");

    Ok(())
}
