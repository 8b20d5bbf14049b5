//! Playlist model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist ID
    pub id: String,
    pub name: String,
    /// Empty descriptions are read back as absent
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    /// Track IDs; may reference tracks that no longer exist
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracks: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Owner user ID
    pub user_id: String,
}

impl Playlist {
    /// Whether the track ID is listed
    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|id| id == track_id)
    }

    /// Shallow-merge a partial update into this playlist
    pub fn apply(&mut self, update: PlaylistUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = non_empty(description);
        }
        if let Some(tracks) = update.tracks {
            self.tracks = tracks;
        }
    }
}

/// Partial playlist update; only present fields are applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some("")` clears the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replaces the whole track list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<String>>,
}

impl PlaylistUpdate {
    pub fn tracks(tracks: Vec<String>) -> Self {
        Self {
            tracks: Some(tracks),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tracks.is_none()
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(non_empty))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
