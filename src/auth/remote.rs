//! Sign-in against the hosted identity service

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{IdentityProvider, Session};
use crate::backend::{is_rejected_token, LibraryError, LibraryResult, SupabaseClient};
use crate::models::{default_avatar_url, display_name_from_email, User};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
    avatar_url: Option<String>,
}

/// User object as the identity service returns it
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<AuthUser> for User {
    fn from(auth: AuthUser) -> Self {
        let email = auth.email.unwrap_or_default();
        let metadata = auth.user_metadata.unwrap_or_default();

        User {
            id: auth.id,
            name: metadata
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| display_name_from_email(&email)),
            avatar_url: Some(
                metadata
                    .avatar_url
                    .filter(|url| !url.is_empty())
                    .unwrap_or_else(|| default_avatar_url(&email)),
            ),
            email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// Sign-up answers with a session, or only the user while the email awaits
/// confirmation
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending(AuthUser),
}

/// Current user behind an access token
pub(crate) async fn fetch_user(client: &SupabaseClient, access_token: &str) -> LibraryResult<User> {
    let request = client.request(Method::GET, &client.auth_url("user"), Some(access_token));
    let user: AuthUser = SupabaseClient::send_json(request).await?;
    Ok(user.into())
}

/// Identity provider backed by the hosted auth endpoints
pub struct RemoteIdentity {
    client: SupabaseClient,
}

impl RemoteIdentity {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn password_grant(&self, email: &str, password: &str) -> LibraryResult<Session> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });

        let token: TokenResponse = SupabaseClient::send_json(request).await?;
        Ok(Session {
            access_token: token.access_token,
            user: token.user.into(),
        })
    }

    /// `None` while the new account awaits email confirmation
    async fn sign_up(&self, email: &str, password: &str) -> LibraryResult<Option<Session>> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"), None)
            .json(&Credentials { email, password });

        match SupabaseClient::send_json(request).await? {
            SignUpResponse::Session(token) => Ok(Some(Session {
                access_token: token.access_token,
                user: token.user.into(),
            })),
            SignUpResponse::Pending(user) => {
                debug!("Account {} created, awaiting confirmation", user.id);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    /// Password sign-in, falling back to sign-up for unknown accounts
    ///
    /// When both fail the sign-in error is the one reported.
    async fn sign_in(&self, email: &str, password: &str) -> LibraryResult<Session> {
        let sign_in_err = match self.password_grant(email, password).await {
            Ok(session) => return Ok(session),
            Err(err) => err,
        };

        debug!("Sign-in failed ({}), trying sign-up", sign_in_err);
        match self.sign_up(email, password).await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(LibraryError::remote(
                "Account created. Please confirm the email address before signing in.",
            )),
            Err(err) => {
                debug!("Sign-up failed too: {}", err);
                Err(sign_in_err)
            }
        }
    }

    async fn sign_out(&self, session: &Session) -> LibraryResult<()> {
        let request = self.client.request(
            Method::POST,
            &self.client.auth_url("logout"),
            Some(session.access_token.as_str()),
        );

        // the local session ends regardless of what the service says
        if let Err(err) = SupabaseClient::send(request).await {
            warn!("Remote sign-out failed: {}", err);
        }
        Ok(())
    }

    async fn resolve(&self, access_token: &str) -> LibraryResult<Option<Session>> {
        let request = self
            .client
            .request(Method::GET, &self.client.auth_url("user"), Some(access_token));
        // transport failures and server errors stay errors
        let response = request.send().await?;
        if is_rejected_token(response.status()) {
            debug!("Token rejected with {}", response.status());
            return Ok(None);
        }

        let user: AuthUser = SupabaseClient::read_json(response).await?;
        Ok(Some(Session {
            access_token: access_token.to_string(),
            user: user.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_mapping_prefers_metadata() {
        let auth: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "dj@example.com",
            "user_metadata": { "name": "DJ Nova", "avatar_url": "https://cdn/a.png" }
        }))
        .unwrap();
        let user = User::from(auth);
        assert_eq!(user.name, "DJ Nova");
        assert_eq!(user.avatar_url.as_deref(), Some("https://cdn/a.png"));
    }

    #[test]
    fn test_user_mapping_falls_back_to_email() {
        let auth: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "dj@example.com",
            "user_metadata": {}
        }))
        .unwrap();
        let user = User::from(auth);
        assert_eq!(user.name, "dj");
        assert_eq!(
            user.avatar_url.as_deref(),
            Some("https://api.dicebear.com/7.x/avataaars/svg?seed=dj@example.com")
        );
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let session: SignUpResponse = serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "token_type": "bearer",
            "user": { "id": "u1", "email": "a@b.co" }
        }))
        .unwrap();
        assert!(matches!(session, SignUpResponse::Session(_)));

        let pending: SignUpResponse = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "a@b.co",
            "confirmation_sent_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert!(matches!(pending, SignUpResponse::Pending(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_not_a_missing_session() {
        // nothing listens on the discard port
        let client = SupabaseClient::new(&crate::config::RemoteConfig {
            url: Some("http://127.0.0.1:9".to_string()),
            anon_key: Some("anon".to_string()),
        })
        .unwrap();
        let identity = RemoteIdentity::new(client);

        assert!(matches!(
            identity.resolve("token").await,
            Err(LibraryError::Remote(_))
        ));
    }
}
