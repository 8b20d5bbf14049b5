//! Track insights
//!
//! Insight generation is emulated: a fixed delay followed by a canned
//! analysis. Progress shown to users is simulated separately from the task.

mod generator;
mod jobs;
pub mod progress;

pub use generator::{canned_insight, InsightGenerator, MockInsightGenerator, DEFAULT_INSIGHT_DELAY};
pub use jobs::{generate_and_store, InsightJobs, JobState, JobStatus, JOB_RETENTION};
pub use progress::{run_with_progress, ProgressTicker, LOADING_STEPS};
