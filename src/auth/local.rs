//! Mock sign-in for the local emulation

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{IdentityProvider, Session};
use crate::backend::{LibraryError, LibraryResult};
use crate::db::{LocalStorageTable, USER_KEY};
use crate::models::User;
use crate::utils::auth::{create_jwt, verify_jwt, SESSION_MAX_AGE};

/// ID given to every locally signed-in user
pub const MOCK_USER_ID: &str = "mock-user-123";

/// Accepts any credentials and keeps the user in local storage
///
/// Tokens are HS256 JWTs signed with the server secret. A token only resolves
/// while the stored user still matches it, so signing out revokes every token
/// issued before.
pub struct LocalIdentity {
    storage: LocalStorageTable,
    secret: String,
    latency: Duration,
}

impl LocalIdentity {
    pub fn new(storage: LocalStorageTable, secret: String, latency: Duration) -> Self {
        Self {
            storage,
            secret,
            latency,
        }
    }

    async fn stored_user(&self) -> LibraryResult<Option<User>> {
        self.storage.read_json(USER_KEY).await
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, email: &str, _password: &str) -> LibraryResult<Session> {
        tokio::time::sleep(self.latency).await;

        let user = User::from_email(MOCK_USER_ID, email);
        self.storage.write_json(USER_KEY, &user).await?;

        let access_token = create_jwt(&user.id, &user.email, &self.secret, SESSION_MAX_AGE)
            .map_err(|err| LibraryError::Storage(format!("failed to issue token: {}", err)))?;

        Ok(Session { access_token, user })
    }

    async fn sign_out(&self, _session: &Session) -> LibraryResult<()> {
        self.storage.remove_item(USER_KEY).await
    }

    async fn resolve(&self, access_token: &str) -> LibraryResult<Option<Session>> {
        let claims = match verify_jwt(access_token, &self.secret) {
            Ok(claims) => claims,
            Err(err) => {
                debug!("Rejected local token: {}", err);
                return Ok(None);
            }
        };

        let session = self
            .stored_user()
            .await?
            .filter(|user| user.id == claims.sub && user.email == claims.email)
            .map(|user| Session {
                access_token: access_token.to_string(),
                user,
            });

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbEngine;
    use tempfile::TempDir;

    async fn identity(dir: &TempDir) -> (LocalIdentity, LocalStorageTable) {
        let engine = DbEngine::open(&dir.path().join("identity.db")).await.unwrap();
        let storage = LocalStorageTable::new(engine);
        (
            LocalIdentity::new(storage.clone(), "secret".to_string(), Duration::ZERO),
            storage,
        )
    }

    #[tokio::test]
    async fn test_sign_in_stores_mock_user() {
        let dir = TempDir::new().unwrap();
        let (identity, storage) = identity(&dir).await;

        let session = identity.sign_in("dj.nova@example.com", "x").await.unwrap();
        assert_eq!(session.user.id, MOCK_USER_ID);
        assert_eq!(session.user.name, "dj.nova");

        let stored: User = storage.read_json(USER_KEY).await.unwrap().unwrap();
        assert_eq!(stored, session.user);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_tokens() {
        let dir = TempDir::new().unwrap();
        let (identity, storage) = identity(&dir).await;

        let session = identity.sign_in("dj@example.com", "x").await.unwrap();
        assert!(identity
            .resolve(&session.access_token)
            .await
            .unwrap()
            .is_some());

        identity.sign_out(&session).await.unwrap();
        assert_eq!(storage.get_item(USER_KEY).await.unwrap(), None);
        assert!(identity
            .resolve(&session.access_token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_token_of_replaced_user_is_stale() {
        let dir = TempDir::new().unwrap();
        let (identity, _) = identity(&dir).await;

        let first = identity.sign_in("first@example.com", "x").await.unwrap();
        identity.sign_in("second@example.com", "x").await.unwrap();

        assert!(identity
            .resolve(&first.access_token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (identity, _) = identity(&dir).await;
        identity.sign_in("dj@example.com", "x").await.unwrap();

        let forged = create_jwt(MOCK_USER_ID, "dj@example.com", "other", 60).unwrap();
        assert!(identity.resolve(&forged).await.unwrap().is_none());
    }
}
