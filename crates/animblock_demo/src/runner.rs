//! Frame loop
//!
//! Stands in for a host's per-frame callback: ticks the scheduler once per
//! frame until every block has finished, printing the watched targets.

use animblock::{AnimationScheduler, ManualClock};
use std::thread;
use std::time::Duration;

use crate::scenarios::Watched;

/// Safety valve for blocks that never finish (a paused block, say)
const MAX_FRAMES: usize = 100_000;

pub enum FrameSource {
    /// Sleep between frames and read the wall clock
    Realtime,
    /// Advance a virtual clock by one frame interval per tick
    Simulated(ManualClock),
}

pub fn run(
    scheduler: &mut AnimationScheduler,
    source: &FrameSource,
    watched: &[Watched],
    print_every: usize,
) -> usize {
    let interval = scheduler.frame_interval();
    let mut frame = 0;

    print_frame(frame, scheduler.now_ms(), watched);

    while !scheduler.is_empty() && frame < MAX_FRAMES {
        wait_frame(source, interval);
        let summary = scheduler.tick();
        frame += 1;

        for (id, error) in &summary.failed {
            tracing::error!(?id, "Block failed: {}", error);
        }

        if frame % print_every.max(1) == 0 || scheduler.is_empty() {
            print_frame(frame, scheduler.now_ms(), watched);
        }
    }

    if !scheduler.is_empty() {
        tracing::warn!(live = scheduler.len(), "Gave up after {} frames", frame);
    }
    frame
}

fn wait_frame(source: &FrameSource, interval: Duration) {
    match source {
        FrameSource::Realtime => thread::sleep(interval),
        FrameSource::Simulated(clock) => clock.advance(interval.as_secs_f64() * 1000.0),
    }
}

fn print_frame(frame: usize, now_ms: f64, watched: &[Watched]) {
    let mut line = format!("frame {frame:>5} @ {now_ms:>8.1}ms");
    for w in watched {
        let bag = w.target.lock();
        let values: Vec<String> = bag
            .iter()
            .map(|(p, value)| format!("{p}={value:.2}"))
            .collect();
        line.push_str(&format!(" | {} {}", w.label, values.join(" ")));
    }
    println!("{line}");
}
