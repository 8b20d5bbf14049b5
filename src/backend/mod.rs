//! Persistence facade
//!
//! One CRUD interface over tracks and playlists. The implementation is chosen
//! once at startup: [`RemoteBackend`] talks to the hosted service,
//! [`LocalBackend`] emulates it with whole-collection snapshots in local
//! storage. Callers hold an `Arc<dyn LibraryBackend>` and never branch on the
//! mode themselves.

mod error;
mod local;
mod remote;
mod supabase;

pub use error::{LibraryError, LibraryResult};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use supabase::{is_rejected_token, SupabaseClient};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::{IdentityProvider, LocalIdentity, RemoteIdentity, Session};
use crate::config::{Paths, RemoteConfig, Settings};
use crate::db::{DbEngine, LocalStorageTable};
use crate::models::{AudioUpload, Insight, Playlist, PlaylistUpdate, Track, TrackMetadata};

/// Which implementation is serving the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Remote,
    Local,
}

/// CRUD operations over tracks and playlists
///
/// Both implementations return the same logical shapes. Lists come back
/// newest-first. No operation retries; failures are surfaced as-is.
#[async_trait]
pub trait LibraryBackend: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn get_tracks(&self, session: &Session) -> LibraryResult<Vec<Track>>;

    /// Store the file and create its track record
    async fn upload_track(
        &self,
        session: &Session,
        file: AudioUpload,
        metadata: TrackMetadata,
    ) -> LibraryResult<Track>;

    /// Replace the track's insight wholesale
    async fn update_track_insights(
        &self,
        session: &Session,
        track_id: &str,
        insight: Insight,
    ) -> LibraryResult<Track>;

    /// Deleting a missing id is a no-op
    async fn delete_track(&self, session: &Session, track_id: &str) -> LibraryResult<()>;

    async fn create_playlist(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> LibraryResult<Playlist>;

    async fn get_playlists(&self, session: &Session) -> LibraryResult<Vec<Playlist>>;

    async fn get_playlist(&self, session: &Session, id: &str) -> LibraryResult<Option<Playlist>>;

    /// Shallow-merge `updates`; a `tracks` update replaces the whole list
    async fn update_playlist(
        &self,
        session: &Session,
        id: &str,
        updates: PlaylistUpdate,
    ) -> LibraryResult<Playlist>;

    /// Deleting a missing id is a no-op
    async fn delete_playlist(&self, session: &Session, id: &str) -> LibraryResult<()>;
}

/// The persistence facade and identity provider of one mode
#[derive(Clone)]
pub struct Backends {
    pub library: Arc<dyn LibraryBackend>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Select and build the backends for this process
///
/// The remote pair is used when `remote` is fully configured, otherwise the
/// local emulation backed by the SQLite file under `paths`.
pub async fn create_backends(
    remote: &RemoteConfig,
    settings: &Settings,
    paths: &Paths,
) -> Result<Backends> {
    if remote.is_configured() {
        let client = SupabaseClient::new(remote)?;
        info!("Creating remote backend for {}", client.base_url());
        return Ok(Backends {
            library: Arc::new(RemoteBackend::new(client.clone())),
            identity: Arc::new(RemoteIdentity::new(client)),
        });
    }

    let db_path = paths.local_db_path();
    info!(
        "Remote backend not configured; creating local emulation at {:?}",
        db_path
    );
    let storage = LocalStorageTable::new(DbEngine::open(&db_path).await?);
    let latency = settings.latency();

    Ok(Backends {
        library: Arc::new(LocalBackend::new(storage.clone(), latency)),
        identity: Arc::new(LocalIdentity::new(
            storage,
            settings.server_secret.clone(),
            latency.sign_in,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unconfigured_remote_selects_local() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(Some(dir.path().to_path_buf())).unwrap();
        let remote = RemoteConfig::default();

        let backends = create_backends(&remote, &Settings::default(), &paths)
            .await
            .unwrap();
        assert_eq!(backends.library.mode(), BackendMode::Local);
        assert!(paths.local_db_path().exists());
    }

    #[tokio::test]
    async fn test_configured_remote_selects_remote() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(Some(dir.path().to_path_buf())).unwrap();
        let remote = RemoteConfig {
            url: Some("https://abc.supabase.co".to_string()),
            anon_key: Some("anon".to_string()),
        };

        let backends = create_backends(&remote, &Settings::default(), &paths)
            .await
            .unwrap();
        assert_eq!(backends.library.mode(), BackendMode::Remote);
        assert!(!paths.local_db_path().exists());
    }
}
