//! Detached insight requests
//!
//! Each request runs generate-then-persist in its own task. Pollers only read
//! the recorded state, so a client that stops polling never cancels the write.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::progress::{progress_percent, run_with_progress, step_at, step_label, LAST_STEP};
use super::InsightGenerator;
use crate::auth::Session;
use crate::backend::{LibraryBackend, LibraryError, LibraryResult};
use crate::models::Track;

/// Finished jobs are forgotten after this long
pub const JOB_RETENTION: Duration = Duration::from_secs(10 * 60);

/// Where a job stands
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Running { started_at: DateTime<Utc> },
    Completed { track: Track },
    Failed { message: String },
}

impl JobState {
    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running { .. })
    }
}

/// Snapshot of a job for pollers
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub id: String,
    pub track_id: String,
    #[serde(flatten)]
    pub state: JobState,
    pub step: usize,
    pub step_label: &'static str,
    pub progress: u8,
}

struct JobEntry {
    track_id: String,
    state: JobState,
    started: Instant,
    finished: Option<Instant>,
}

impl JobEntry {
    fn status(&self, id: &str) -> JobStatus {
        let step = match self.state {
            JobState::Running { .. } => step_at(self.started.elapsed()),
            _ => LAST_STEP,
        };

        JobStatus {
            id: id.to_string(),
            track_id: self.track_id.clone(),
            state: self.state.clone(),
            step,
            step_label: step_label(step),
            progress: progress_percent(step),
        }
    }
}

/// Generate an insight for `track` and store it on the track
///
/// Progress steps are logged while the generator runs.
pub async fn generate_and_store(
    generator: &dyn InsightGenerator,
    library: &dyn LibraryBackend,
    session: &Session,
    track: &Track,
) -> LibraryResult<Track> {
    let insight = run_with_progress(generator.generate(track), |step| {
        debug!("[{}] {}", track.id, step_label(step))
    })
    .await;
    library
        .update_track_insights(session, &track.id, insight)
        .await
}

/// Registry of insight jobs
#[derive(Clone)]
pub struct InsightJobs {
    generator: Arc<dyn InsightGenerator>,
    library: Arc<dyn LibraryBackend>,
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl InsightJobs {
    pub fn new(generator: Arc<dyn InsightGenerator>, library: Arc<dyn LibraryBackend>) -> Self {
        Self {
            generator,
            library,
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up the track and start a job for it
    pub async fn request(&self, session: &Session, track_id: &str) -> LibraryResult<JobStatus> {
        let track = self
            .library
            .get_tracks(session)
            .await?
            .into_iter()
            .find(|t| t.id == track_id)
            .ok_or(LibraryError::NotFound("Track"))?;

        Ok(self.start(session.clone(), track))
    }

    /// Start generating for `track` in a detached task
    pub fn start(&self, session: Session, track: Track) -> JobStatus {
        self.prune(JOB_RETENTION);

        let id = Uuid::new_v4().to_string();
        let entry = JobEntry {
            track_id: track.id.clone(),
            state: JobState::Running {
                started_at: Utc::now(),
            },
            started: Instant::now(),
            finished: None,
        };
        let status = entry.status(&id);
        self.jobs.write().insert(id.clone(), entry);
        info!("Insight job {} started for track {}", id, track.id);

        let generator = self.generator.clone();
        let library = self.library.clone();
        let jobs = self.jobs.clone();
        let job_id = id;
        tokio::spawn(async move {
            let result =
                generate_and_store(generator.as_ref(), library.as_ref(), &session, &track).await;

            let state = match result {
                Ok(track) => {
                    debug!("Insight job {} completed", job_id);
                    JobState::Completed { track }
                }
                Err(err) => {
                    warn!("Insight job {} failed: {}", job_id, err);
                    JobState::Failed {
                        message: err.to_string(),
                    }
                }
            };

            if let Some(entry) = jobs.write().get_mut(&job_id) {
                entry.state = state;
                entry.finished = Some(Instant::now());
            }
        });

        status
    }

    pub fn status(&self, id: &str) -> Option<JobStatus> {
        self.jobs.read().get(id).map(|entry| entry.status(id))
    }

    /// Forget jobs that finished more than `max_age` ago
    pub fn prune(&self, max_age: Duration) -> usize {
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, entry| match entry.finished {
            Some(finished) => finished.elapsed() < max_age,
            None => true,
        });
        before - jobs.len()
    }
}
