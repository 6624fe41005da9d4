//! Driving a simulation across many ticks.
//!
//! The only suspension point is the tick boundary: the loop may sleep there
//! to honor a frame interval, and a cancellation request is observed there.
//! A tick that has started always runs to completion.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::SimError;
use crate::field::FieldSnapshot;
use crate::sim::Simulation;

/// Shared flag for requesting that a run stop at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many ticks. `None` runs until cancelled or halted.
    pub max_ticks: Option<u64>,
    /// Minimum wall time between tick starts.
    pub frame_interval: Option<Duration>,
}

impl RunOptions {
    pub fn ticks(n: u64) -> Self {
        Self {
            max_ticks: Some(n),
            frame_interval: None,
        }
    }

    /// Cap the tick rate at `fps` ticks per second. Non-positive rates are
    /// ignored.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.frame_interval =
            (fps.is_finite() && fps > 0.0).then(|| Duration::from_secs_f64(1.0 / fps));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_ticks` reached.
    Completed,
    /// The cancel token was set.
    Cancelled,
    /// The per-tick callback returned `ControlFlow::Break`.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// Tick `sim` until `options.max_ticks`, cancellation, or `on_tick` breaks.
///
/// `on_tick` receives each published snapshot together with the time the tick
/// itself took. The simulation is left in its current state; stopping it is
/// up to the caller.
pub fn run<F>(
    sim: &mut Simulation,
    options: &RunOptions,
    cancel: &CancelToken,
    mut on_tick: F,
) -> Result<RunSummary, SimError>
where
    F: FnMut(&FieldSnapshot, Duration) -> ControlFlow<()>,
{
    let started = Instant::now();
    let mut ticks = 0u64;
    let mut next_frame = started;

    let stop_reason = loop {
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break StopReason::Completed;
        }
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }
        if let Some(interval) = options.frame_interval {
            let now = Instant::now();
            if next_frame > now {
                std::thread::sleep(next_frame - now);
            }
            next_frame = next_frame.max(now) + interval;
        }

        let tick_start = Instant::now();
        let snapshot = sim.tick()?;
        ticks += 1;
        if on_tick(&snapshot, tick_start.elapsed()).is_break() {
            break StopReason::Halted;
        }
    };

    let summary = RunSummary {
        ticks,
        stop_reason,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        ticks = summary.ticks,
        reason = ?summary.stop_reason,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run finished"
    );
    Ok(summary)
}
