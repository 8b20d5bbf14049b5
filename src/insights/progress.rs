//! Simulated progress of an insight request
//!
//! Progress is presentation only. The step shown is a pure function of the
//! time since the request started and knows nothing about the real task,
//! which may finish before or after the last step is reached.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Phase labels, in display order
pub const LOADING_STEPS: [&str; 5] = [
    "Extracting audio features...",
    "Analyzing tempo and rhythm...",
    "Detecting emotional tone...",
    "Matching with industry trends...",
    "Generating final report...",
];

pub const LAST_STEP: usize = LOADING_STEPS.len() - 1;

/// Time spent on each phase
pub const STEP_INTERVAL: Duration = Duration::from_secs(1);

/// Step index after `elapsed`; one per second, clamped at the last
pub fn step_at(elapsed: Duration) -> usize {
    let steps = (elapsed.as_millis() / STEP_INTERVAL.as_millis()) as usize;
    steps.min(LAST_STEP)
}

pub fn step_label(step: usize) -> &'static str {
    LOADING_STEPS[step.min(LAST_STEP)]
}

/// Share of the bar filled at `step`, as a whole percentage
pub fn progress_percent(step: usize) -> u8 {
    let filled = step.min(LAST_STEP) + 1;
    (filled * 100 / LOADING_STEPS.len()) as u8
}

/// Emits the next step once per interval until the last step is reached
pub struct ProgressTicker {
    interval: Interval,
    step: usize,
}

impl ProgressTicker {
    /// Ticker at step 0; the first change comes one interval from now
    pub fn start() -> Self {
        let mut interval = interval_at(Instant::now() + STEP_INTERVAL, STEP_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, step: 0 }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= LAST_STEP
    }

    /// Wait for the next step; `None` once the last step has been shown
    pub async fn next(&mut self) -> Option<usize> {
        if self.is_finished() {
            return None;
        }
        self.interval.tick().await;
        self.step += 1;
        Some(self.step)
    }
}

/// Drive `task` to completion while reporting steps to `on_step`
///
/// Step 0 is reported immediately. The task's result wins any tie with a tick,
/// and no step is reported after it finishes.
pub async fn run_with_progress<F, T>(task: F, mut on_step: impl FnMut(usize)) -> T
where
    F: Future<Output = T>,
{
    let mut ticker = ProgressTicker::start();
    on_step(ticker.step());

    tokio::pin!(task);
    loop {
        tokio::select! {
            biased;
            output = &mut task => return output,
            Some(step) = ticker.next(), if !ticker.is_finished() => on_step(step),
        }
    }
}
