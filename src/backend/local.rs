//! Local emulation of the persistence facade
//!
//! Every collection lives as one JSON snapshot in the key/value table. Writes
//! are read-modify-write cycles over the whole snapshot, serialized per
//! collection so two concurrent writers never drop each other's change.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{BackendMode, LibraryBackend, LibraryError, LibraryResult};
use crate::auth::Session;
use crate::config::LatencyProfile;
use crate::db::{LocalStorageTable, PLAYLISTS_KEY, TRACKS_KEY, USER_KEY};
use crate::models::{
    non_empty, AudioUpload, Insight, Playlist, PlaylistUpdate, Track, TrackMetadata, User,
    PLACEHOLDER_DURATION,
};

/// Encode file contents as a `data:` URI
pub fn to_data_uri(upload: &AudioUpload) -> String {
    format!(
        "data:{};base64,{}",
        upload.content_type,
        base64::engine::general_purpose::STANDARD.encode(&upload.bytes)
    )
}

/// Snapshot-backed library with simulated network latency
pub struct LocalBackend {
    storage: LocalStorageTable,
    latency: LatencyProfile,
    tracks_lock: Mutex<()>,
    playlists_lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(storage: LocalStorageTable, latency: LatencyProfile) -> Self {
        Self {
            storage,
            latency,
            tracks_lock: Mutex::new(()),
            playlists_lock: Mutex::new(()),
        }
    }

    /// The user kept by the local identity; absent means signed out
    async fn current_user(&self) -> LibraryResult<User> {
        self.storage
            .read_json::<User>(USER_KEY)
            .await?
            .ok_or(LibraryError::Unauthorized)
    }

    async fn simulate(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn tracks(&self) -> LibraryResult<Vec<Track>> {
        self.storage.read_list(TRACKS_KEY).await
    }

    async fn playlists(&self) -> LibraryResult<Vec<Playlist>> {
        self.storage.read_list(PLAYLISTS_KEY).await
    }
}

#[async_trait]
impl LibraryBackend for LocalBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn get_tracks(&self, _session: &Session) -> LibraryResult<Vec<Track>> {
        self.simulate(self.latency.list).await;
        self.tracks().await
    }

    async fn upload_track(
        &self,
        _session: &Session,
        file: AudioUpload,
        metadata: TrackMetadata,
    ) -> LibraryResult<Track> {
        let user = self.current_user().await?;

        let track = Track {
            id: Uuid::new_v4().to_string(),
            title: metadata.title,
            artist: metadata.artist,
            genre: metadata.genre,
            bpm: metadata.bpm,
            duration: PLACEHOLDER_DURATION,
            url: to_data_uri(&file),
            created_at: Utc::now(),
            user_id: user.id,
            insights: None,
        };

        {
            let _guard = self.tracks_lock.lock().await;
            let mut tracks = self.tracks().await?;
            tracks.insert(0, track.clone());
            self.storage.write_json(TRACKS_KEY, &tracks).await?;
        }
        debug!("Stored track {} ({} bytes)", track.id, file.size());

        // the snapshot is already written while the caller waits
        self.simulate(self.latency.upload).await;
        Ok(track)
    }

    async fn update_track_insights(
        &self,
        _session: &Session,
        track_id: &str,
        insight: Insight,
    ) -> LibraryResult<Track> {
        let _guard = self.tracks_lock.lock().await;
        let mut tracks = self.tracks().await?;

        let track = tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(LibraryError::NotFound("Track"))?;
        track.insights = Some(insight);
        let updated = track.clone();

        self.storage.write_json(TRACKS_KEY, &tracks).await?;
        Ok(updated)
    }

    async fn delete_track(&self, _session: &Session, track_id: &str) -> LibraryResult<()> {
        let _guard = self.tracks_lock.lock().await;
        let mut tracks = self.tracks().await?;
        tracks.retain(|t| t.id != track_id);
        self.storage.write_json(TRACKS_KEY, &tracks).await
    }

    async fn create_playlist(
        &self,
        _session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> LibraryResult<Playlist> {
        let user = self.current_user().await?;

        let playlist = Playlist {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string).and_then(non_empty),
            tracks: Vec::new(),
            created_at: Utc::now(),
            user_id: user.id,
        };

        let _guard = self.playlists_lock.lock().await;
        let mut playlists = self.playlists().await?;
        playlists.insert(0, playlist.clone());
        self.storage.write_json(PLAYLISTS_KEY, &playlists).await?;
        Ok(playlist)
    }

    async fn get_playlists(&self, _session: &Session) -> LibraryResult<Vec<Playlist>> {
        self.simulate(self.latency.list).await;
        self.playlists().await
    }

    async fn get_playlist(&self, _session: &Session, id: &str) -> LibraryResult<Option<Playlist>> {
        Ok(self.playlists().await?.into_iter().find(|p| p.id == id))
    }

    async fn update_playlist(
        &self,
        _session: &Session,
        id: &str,
        updates: PlaylistUpdate,
    ) -> LibraryResult<Playlist> {
        let _guard = self.playlists_lock.lock().await;
        let mut playlists = self.playlists().await?;

        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LibraryError::NotFound("Playlist"))?;
        playlist.apply(updates);
        let updated = playlist.clone();

        self.storage.write_json(PLAYLISTS_KEY, &playlists).await?;
        Ok(updated)
    }

    async fn delete_playlist(&self, _session: &Session, id: &str) -> LibraryResult<()> {
        let _guard = self.playlists_lock.lock().await;
        let mut playlists = self.playlists().await?;
        playlists.retain(|p| p.id != id);
        self.storage.write_json(PLAYLISTS_KEY, &playlists).await
    }
}
