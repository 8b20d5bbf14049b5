//! Insight generation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::models::{Insight, Track};

/// Fixed time the mock generator takes
pub const DEFAULT_INSIGHT_DELAY: Duration = Duration::from_secs(5);

/// Produces an insight for a track
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, track: &Track) -> Insight;
}

/// Waits a fixed delay, then returns the same canned analysis for every track
#[derive(Debug, Clone)]
pub struct MockInsightGenerator {
    delay: Duration,
}

impl MockInsightGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockInsightGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_INSIGHT_DELAY)
    }
}

#[async_trait]
impl InsightGenerator for MockInsightGenerator {
    async fn generate(&self, track: &Track) -> Insight {
        debug!("Analyzing {} ({})", track.title, track.id);
        tokio::time::sleep(self.delay).await;
        canned_insight(Utc::now())
    }
}

/// The static analysis payload, stamped with `generated_at`
pub fn canned_insight(generated_at: DateTime<Utc>) -> Insight {
    Insight {
        mood: "Energetic, driving, and optimistic with a futuristic cyberpunk undertone."
            .to_string(),
        commercial_viability: "8/10 - Strong potential for advertising and sports highlights."
            .to_string(),
        suggested_placements: vec![
            "Tech Product Commercials".to_string(),
            "Racing Video Games".to_string(),
            "Sports Montages".to_string(),
            "Action Movie Chase Scenes".to_string(),
        ],
        summary: "A high-octane electronic track that combines aggressive basslines with uplifting synth melodies."
            .to_string(),
        generated_at,
    }
}
