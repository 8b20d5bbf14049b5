//! Playlist library functions

use serde::Serialize;

use crate::auth::Session;
use crate::backend::{LibraryBackend, LibraryError, LibraryResult};
use crate::models::{Playlist, PlaylistUpdate, Track};

/// A playlist with its tracks resolved against the library
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistDetail {
    pub playlist: Playlist,
    /// Listed tracks that still exist, in library order
    pub tracks: Vec<Track>,
    /// Library tracks not in the playlist, narrowed by the search query
    pub available: Vec<Track>,
}

/// Tracks of `playlist` that are still in `library`
///
/// Dangling IDs are skipped. Order follows the library listing.
pub fn playlist_tracks(playlist: &Playlist, library: &[Track]) -> Vec<Track> {
    library
        .iter()
        .filter(|t| playlist.contains(&t.id))
        .cloned()
        .collect()
}

/// Tracks that can still be added, matching `query` on title or artist
pub fn available_tracks(playlist: &Playlist, library: &[Track], query: &str) -> Vec<Track> {
    library
        .iter()
        .filter(|t| !playlist.contains(&t.id))
        .filter(|t| t.matches_query(query))
        .cloned()
        .collect()
}

/// Playlist library functions
pub struct PlaylistLib;

impl PlaylistLib {
    async fn require(
        backend: &dyn LibraryBackend,
        session: &Session,
        id: &str,
    ) -> LibraryResult<Playlist> {
        backend
            .get_playlist(session, id)
            .await?
            .ok_or(LibraryError::NotFound("Playlist"))
    }

    /// Playlist detail view
    pub async fn detail(
        backend: &dyn LibraryBackend,
        session: &Session,
        id: &str,
        query: &str,
    ) -> LibraryResult<PlaylistDetail> {
        let playlist = Self::require(backend, session, id).await?;
        let library = backend.get_tracks(session).await?;

        Ok(PlaylistDetail {
            tracks: playlist_tracks(&playlist, &library),
            available: available_tracks(&playlist, &library, query.trim()),
            playlist,
        })
    }

    /// Append a track; the whole new list is written back
    pub async fn add_track(
        backend: &dyn LibraryBackend,
        session: &Session,
        id: &str,
        track_id: &str,
    ) -> LibraryResult<Playlist> {
        let playlist = Self::require(backend, session, id).await?;

        let mut tracks = playlist.tracks;
        tracks.push(track_id.to_string());
        backend
            .update_playlist(session, id, PlaylistUpdate::tracks(tracks))
            .await
    }

    /// Drop every occurrence of a track
    pub async fn remove_track(
        backend: &dyn LibraryBackend,
        session: &Session,
        id: &str,
        track_id: &str,
    ) -> LibraryResult<Playlist> {
        let playlist = Self::require(backend, session, id).await?;

        let tracks = playlist
            .tracks
            .into_iter()
            .filter(|t| t != track_id)
            .collect();
        backend
            .update_playlist(session, id, PlaylistUpdate::tracks(tracks))
            .await
    }
}
