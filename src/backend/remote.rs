//! Hosted backend implementation of the persistence facade

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{BackendMode, LibraryBackend, LibraryError, LibraryResult, SupabaseClient};
use crate::auth::{fetch_user, Session};
use crate::models::{
    AudioUpload, Insight, Playlist, PlaylistUpdate, Track, TrackMetadata, User,
    PLACEHOLDER_DURATION,
};

const TRACKS_TABLE: &str = "tracks";
const PLAYLISTS_TABLE: &str = "playlists";
const AUDIO_BUCKET: &str = "audio";

#[derive(Serialize)]
struct NewTrackRow<'a> {
    user_id: &'a str,
    title: &'a str,
    artist: &'a str,
    genre: &'a str,
    bpm: u32,
    duration: u32,
    url: &'a str,
    insights: Option<&'a Insight>,
}

#[derive(Serialize)]
struct NewPlaylistRow<'a> {
    user_id: &'a str,
    name: &'a str,
    description: &'a str,
    tracks: &'a [String],
}

#[derive(Serialize)]
struct InsightsPatch<'a> {
    insights: &'a Insight,
}

/// Persistence facade over the hosted tables and object storage
pub struct RemoteBackend {
    client: SupabaseClient,
}

impl RemoteBackend {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// The user behind the session, as the identity service sees it now
    async fn authenticated_user(&self, session: &Session) -> LibraryResult<User> {
        fetch_user(&self.client, &session.access_token)
            .await
            .map_err(|err| {
                debug!("Session rejected by identity service: {}", err);
                LibraryError::Unauthorized
            })
    }

    fn select_all(&self, table: &str, session: &Session) -> RequestBuilder {
        self.client
            .request(
                Method::GET,
                &self.client.rest_url(table),
                Some(session.access_token.as_str()),
            )
            .query(&[("select", "*"), ("order", "created_at.desc")])
    }

    fn with_id(&self, method: Method, table: &str, session: &Session, id: &str) -> RequestBuilder {
        self.client
            .request(
                method,
                &self.client.rest_url(table),
                Some(session.access_token.as_str()),
            )
            .query(&[("id", format!("eq.{}", id))])
    }

    fn returning(request: RequestBuilder) -> RequestBuilder {
        request
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
    }

    /// First row of a representation response
    async fn first_row<T: DeserializeOwned>(request: RequestBuilder) -> LibraryResult<Option<T>> {
        let rows: Vec<T> = SupabaseClient::send_json(request).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl LibraryBackend for RemoteBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Remote
    }

    async fn get_tracks(&self, session: &Session) -> LibraryResult<Vec<Track>> {
        SupabaseClient::send_json(self.select_all(TRACKS_TABLE, session)).await
    }

    async fn upload_track(
        &self,
        session: &Session,
        file: AudioUpload,
        metadata: TrackMetadata,
    ) -> LibraryResult<Track> {
        let user = self.authenticated_user(session).await?;

        let extension: String = file
            .extension()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let object_path = format!("{}/{}.{}", user.id, Utc::now().timestamp_millis(), extension);
        let size = file.size();

        // the record is only inserted once the file is stored
        let upload = self
            .client
            .request(
                Method::POST,
                &self.client.object_url(AUDIO_BUCKET, &object_path),
                Some(session.access_token.as_str()),
            )
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.bytes);
        SupabaseClient::send(upload).await?;
        debug!("Stored {} ({} bytes)", object_path, size);

        let url = self.client.public_object_url(AUDIO_BUCKET, &object_path);
        let row = NewTrackRow {
            user_id: &user.id,
            title: &metadata.title,
            artist: &metadata.artist,
            genre: &metadata.genre,
            bpm: metadata.bpm,
            duration: PLACEHOLDER_DURATION,
            url: &url,
            insights: None,
        };
        let insert = Self::returning(
            self.client
                .request(
                    Method::POST,
                    &self.client.rest_url(TRACKS_TABLE),
                    Some(session.access_token.as_str()),
                )
                .json(&row),
        );

        Self::first_row(insert)
            .await?
            .ok_or_else(|| LibraryError::remote("Track insert returned no row"))
    }

    async fn update_track_insights(
        &self,
        session: &Session,
        track_id: &str,
        insight: Insight,
    ) -> LibraryResult<Track> {
        let patch = Self::returning(
            self.with_id(Method::PATCH, TRACKS_TABLE, session, track_id)
                .json(&InsightsPatch { insights: &insight }),
        );

        Self::first_row(patch)
            .await?
            .ok_or(LibraryError::NotFound("Track"))
    }

    async fn delete_track(&self, session: &Session, track_id: &str) -> LibraryResult<()> {
        SupabaseClient::send(self.with_id(Method::DELETE, TRACKS_TABLE, session, track_id)).await
    }

    async fn create_playlist(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> LibraryResult<Playlist> {
        let user = self.authenticated_user(session).await?;

        let row = NewPlaylistRow {
            user_id: &user.id,
            name,
            description: description.unwrap_or_default(),
            tracks: &[],
        };
        let insert = Self::returning(
            self.client
                .request(
                    Method::POST,
                    &self.client.rest_url(PLAYLISTS_TABLE),
                    Some(session.access_token.as_str()),
                )
                .json(&row),
        );

        Self::first_row(insert)
            .await?
            .ok_or_else(|| LibraryError::remote("Playlist insert returned no row"))
    }

    async fn get_playlists(&self, session: &Session) -> LibraryResult<Vec<Playlist>> {
        SupabaseClient::send_json(self.select_all(PLAYLISTS_TABLE, session)).await
    }

    async fn get_playlist(&self, session: &Session, id: &str) -> LibraryResult<Option<Playlist>> {
        let request = self
            .with_id(Method::GET, PLAYLISTS_TABLE, session, id)
            .query(&[("select", "*")]);

        // a failed lookup reads as "not found"
        match Self::first_row(request).await {
            Ok(playlist) => Ok(playlist),
            Err(err) => {
                warn!("Playlist lookup for {} failed: {}", id, err);
                Ok(None)
            }
        }
    }

    async fn update_playlist(
        &self,
        session: &Session,
        id: &str,
        updates: PlaylistUpdate,
    ) -> LibraryResult<Playlist> {
        if updates.is_empty() {
            return self
                .get_playlist(session, id)
                .await?
                .ok_or(LibraryError::NotFound("Playlist"));
        }

        let patch = Self::returning(
            self.with_id(Method::PATCH, PLAYLISTS_TABLE, session, id)
                .json(&updates),
        );

        Self::first_row(patch)
            .await?
            .ok_or(LibraryError::NotFound("Playlist"))
    }

    async fn delete_playlist(&self, session: &Session, id: &str) -> LibraryResult<()> {
        SupabaseClient::send(self.with_id(Method::DELETE, PLAYLISTS_TABLE, session, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;

    fn backend() -> RemoteBackend {
        RemoteBackend::new(
            SupabaseClient::new(&RemoteConfig {
                url: Some("https://abc.supabase.co".to_string()),
                anon_key: Some("anon".to_string()),
            })
            .unwrap(),
        )
    }

    fn session() -> Session {
        Session {
            access_token: "token".to_string(),
            user: User::from_email("u1", "a@b.co"),
        }
    }

    #[test]
    fn test_select_all_orders_newest_first() {
        let request = backend()
            .select_all(TRACKS_TABLE, &session())
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://abc.supabase.co/rest/v1/tracks?select=*&order=created_at.desc"
        );
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer token");
    }

    #[test]
    fn test_patch_filters_by_id_and_returns_rows() {
        let request = RemoteBackend::returning(backend().with_id(
            Method::PATCH,
            PLAYLISTS_TABLE,
            &session(),
            "p1",
        ))
        .build()
        .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://abc.supabase.co/rest/v1/playlists?id=eq.p1&select=*"
        );
        assert_eq!(request.headers()["prefer"], "return=representation");
    }

    #[test]
    fn test_new_playlist_row_shape() {
        let row = NewPlaylistRow {
            user_id: "u1",
            name: "Summer Hits 2024",
            description: "",
            tracks: &[],
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({
                "user_id": "u1",
                "name": "Summer Hits 2024",
                "description": "",
                "tracks": []
            })
        );
    }
}
