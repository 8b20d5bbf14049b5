//! Track model

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Insight;

/// Duration recorded for every upload until real probing exists
pub const PLACEHOLDER_DURATION: u32 = 180;

/// An uploaded audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    /// Tempo in beats per minute
    pub bpm: u32,
    /// Duration in seconds
    pub duration: u32,
    /// Public URL or `data:` URI of the audio content
    pub url: String,
    pub created_at: DateTime<Utc>,
    /// Owner user ID
    pub user_id: String,
    /// Latest insight, if one was generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insight>,
}

impl Track {
    /// Whether an insight has been attached
    pub fn has_insights(&self) -> bool {
        self.insights.is_some()
    }

    /// Case-insensitive match on title or artist
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.artist.to_lowercase().contains(&query)
    }
}

/// Metadata supplied with an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub bpm: u32,
}

/// Raw audio file received for upload
#[derive(Debug, Clone)]
pub struct AudioUpload {
    /// Original file name, including its extension
    pub file_name: String,
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
    pub bytes: Bytes,
}

impl AudioUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// File extension as the object store path expects it
    ///
    /// A name without a dot is used whole.
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, artist: &str) -> Track {
        Track {
            id: "t1".to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            genre: "Synthwave".to_string(),
            bpm: 120,
            duration: PLACEHOLDER_DURATION,
            url: "data:audio/mpeg;base64,AA==".to_string(),
            created_at: Utc::now(),
            user_id: "u1".to_string(),
            insights: None,
        }
    }

    #[test]
    fn test_matches_query() {
        let t = track("Neon Nights", "Midnight Driver");
        assert!(t.matches_query("neon"));
        assert!(t.matches_query("DRIVER"));
        assert!(t.matches_query(""));
        assert!(!t.matches_query("sunrise"));
    }

    #[test]
    fn test_insights_skipped_when_absent() {
        let value = serde_json::to_value(track("A", "B")).unwrap();
        assert!(value.get("insights").is_none());

        let parsed: Track = serde_json::from_value(serde_json::json!({
            "id": "t2",
            "title": "A",
            "artist": "B",
            "genre": "C",
            "bpm": 90,
            "duration": 180,
            "url": "https://cdn.example.com/a.mp3",
            "created_at": "2024-05-01T10:00:00.123456+00:00",
            "user_id": "u1",
            "insights": null
        }))
        .unwrap();
        assert!(!parsed.has_insights());
    }

    #[test]
    fn test_extension() {
        let upload = AudioUpload::new("mix.final.wav", "audio/wav", Bytes::from_static(b"x"));
        assert_eq!(upload.extension(), "wav");
        let bare = AudioUpload::new("mixdown", "audio/wav", Bytes::from_static(b"x"));
        assert_eq!(bare.extension(), "mixdown");
    }
}
