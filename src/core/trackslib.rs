//! Track library functions

use serde::Serialize;

use crate::auth::Session;
use crate::backend::{LibraryBackend, LibraryResult};
use crate::models::Track;
use crate::utils::dates::{format_track_duration, seconds_to_human_readable, to_relative};

/// Library counts shown on the profile page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub tracks: usize,
    pub playlists: usize,
    pub analyzed_tracks: usize,
    /// Sum of track durations, e.g. "1 hr, 30 min"
    pub total_duration: String,
}

/// A track as listed on the dashboard and insights pages
#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    #[serde(flatten)]
    pub track: Track,
    /// `m:ss`
    pub length: String,
    /// e.g. "3 hours ago"
    pub uploaded: String,
    pub insights_ready: bool,
}

impl From<Track> for TrackSummary {
    fn from(track: Track) -> Self {
        Self {
            length: format_track_duration(track.duration),
            uploaded: to_relative(&track.created_at),
            insights_ready: track.has_insights(),
            track,
        }
    }
}

/// Track library functions
pub struct TracksLib;

impl TracksLib {
    /// All tracks, newest first, ready for listing
    pub async fn summaries(
        backend: &dyn LibraryBackend,
        session: &Session,
    ) -> LibraryResult<Vec<TrackSummary>> {
        let tracks = backend.get_tracks(session).await?;
        Ok(tracks.into_iter().map(TrackSummary::from).collect())
    }

    pub fn stats(tracks: &[Track], playlists: usize) -> LibraryStats {
        let seconds: u64 = tracks.iter().map(|t| u64::from(t.duration)).sum();

        LibraryStats {
            tracks: tracks.len(),
            playlists,
            analyzed_tracks: tracks.iter().filter(|t| t.has_insights()).count(),
            total_duration: seconds_to_human_readable(seconds),
        }
    }

    /// Counts for the signed-in user's library
    pub async fn library_stats(
        backend: &dyn LibraryBackend,
        session: &Session,
    ) -> LibraryResult<LibraryStats> {
        let tracks = backend.get_tracks(session).await?;
        let playlists = backend.get_playlists(session).await?;
        Ok(Self::stats(&tracks, playlists.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::canned_insight;
    use chrono::Utc;

    fn track(id: &str, analyzed: bool) -> Track {
        Track {
            id: id.to_string(),
            title: "T".to_string(),
            artist: "A".to_string(),
            genre: "G".to_string(),
            bpm: 100,
            duration: 180,
            url: String::new(),
            created_at: Utc::now(),
            user_id: "u1".to_string(),
            insights: analyzed.then(|| canned_insight(Utc::now())),
        }
    }

    #[test]
    fn test_stats() {
        let tracks = vec![track("a", true), track("b", false), track("c", false)];
        let stats = TracksLib::stats(&tracks, 2);
        assert_eq!(stats.tracks, 3);
        assert_eq!(stats.playlists, 2);
        assert_eq!(stats.analyzed_tracks, 1);
        assert_eq!(stats.total_duration, "9 min");
    }

    #[test]
    fn test_summary_flattens_track() {
        let summary = TrackSummary::from(track("a", true));
        assert_eq!(summary.length, "3:00");
        assert!(summary.insights_ready);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["length"], "3:00");
        assert!(value.get("insights").is_some());
    }
}
