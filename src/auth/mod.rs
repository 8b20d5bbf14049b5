//! Sessions and identity
//!
//! A [`Session`] is established at sign-in and handed to every persistence
//! call. The [`IdentityProvider`] behind it is either the hosted identity
//! service or the local mock; [`SessionManager`] owns the lifecycle and
//! tells subscribers when the signed-in user changes.

mod local;
mod remote;

pub use local::LocalIdentity;
pub use remote::RemoteIdentity;

pub(crate) use remote::fetch_user;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::backend::{LibraryError, LibraryResult};
use crate::models::User;
use crate::utils::validation::require_field;

const EVENT_CAPACITY: usize = 16;

/// Authenticated context passed to library operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Change of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

/// Issues and resolves sessions
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> LibraryResult<Session>;

    async fn sign_out(&self, session: &Session) -> LibraryResult<()>;

    /// The live session behind `access_token`, if it is still valid
    async fn resolve(&self, access_token: &str) -> LibraryResult<Option<Session>>;
}

/// Session lifecycle over one identity provider
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { provider, events }
    }

    /// Receive every auth change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> LibraryResult<Session> {
        require_field("Email", email)?;
        require_field("Password", password)?;

        let session = self.provider.sign_in(email.trim(), password).await?;
        info!("Signed in {}", session.user.email);
        self.publish(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    pub async fn sign_out(&self, session: &Session) -> LibraryResult<()> {
        self.provider.sign_out(session).await?;
        info!("Signed out {}", session.user.email);
        self.publish(AuthEvent::SignedOut);
        Ok(())
    }

    /// Session for a bearer token; invalid or expired tokens are Unauthorized
    pub async fn session_from_token(&self, access_token: &str) -> LibraryResult<Session> {
        if access_token.is_empty() {
            return Err(LibraryError::Unauthorized);
        }
        self.provider
            .resolve(access_token)
            .await?
            .ok_or(LibraryError::Unauthorized)
    }

    fn publish(&self, event: AuthEvent) {
        // no subscribers is fine
        if self.events.send(event).is_err() {
            debug!("No auth listeners");
        }
    }
}
