//! Key/value snapshot table backing the local emulation

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::DbEngine;
use crate::backend::LibraryResult;

/// Key of the signed-in user record
pub const USER_KEY: &str = "soundflow_user";
/// Key of the track list snapshot
pub const TRACKS_KEY: &str = "soundflow_tracks";
/// Key of the playlist list snapshot
pub const PLAYLISTS_KEY: &str = "soundflow_playlists";

/// String-keyed storage holding whole serialized collections
#[derive(Clone)]
pub struct LocalStorageTable {
    engine: DbEngine,
}

impl LocalStorageTable {
    pub fn new(engine: DbEngine) -> Self {
        Self { engine }
    }

    /// Raw value stored under `key`
    pub async fn get_item(&self, key: &str) -> LibraryResult<Option<String>> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(self.engine.pool())
            .await?;

        Ok(value.map(|(v,)| v))
    }

    /// Store `value` under `key`, replacing any previous value
    pub async fn set_item(&self, key: &str, value: &str) -> LibraryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.engine.pool())
        .await?;

        Ok(())
    }

    /// Delete `key`; deleting a missing key is a no-op
    pub async fn remove_item(&self, key: &str) -> LibraryResult<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(self.engine.pool())
            .await?;

        Ok(())
    }

    /// Deserialize the record stored under `key`
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> LibraryResult<Option<T>> {
        match self.get_item(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> LibraryResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw).await
    }

    /// Whole collection stored under `key`; a missing key reads as empty
    pub async fn read_list<T: DeserializeOwned>(&self, key: &str) -> LibraryResult<Vec<T>> {
        Ok(self.read_json(key).await?.unwrap_or_default())
    }
}
