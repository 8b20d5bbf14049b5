//! Thin HTTP client for the hosted backend (auth, tables, object storage)

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{LibraryError, LibraryResult};
use crate::config::RemoteConfig;

/// Client bound to one project endpoint and access key
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base_url = config
            .url
            .clone()
            .context("Remote endpoint URL is not set")?;
        let anon_key = config
            .anon_key
            .clone()
            .context("Remote access key is not set")?;

        let http = Client::builder()
            .user_agent(concat!("soundflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            anon_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Table endpoint, e.g. `<base>/rest/v1/tracks`
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Auth endpoint, e.g. `<base>/auth/v1/user`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Upload endpoint of an object
    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    /// Publicly readable URL of an object
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }

    /// Request carrying the access key and the caller's bearer token
    ///
    /// Without a token the access key doubles as the bearer, which is how the
    /// hosted service identifies anonymous callers.
    pub fn request(&self, method: Method, url: &str, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Send and decode a JSON response
    pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> LibraryResult<T> {
        Self::read_json(request.send().await?).await
    }

    /// Decode a JSON response already received
    pub async fn read_json<T: DeserializeOwned>(response: Response) -> LibraryResult<T> {
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send and discard the response body
    pub async fn send(request: RequestBuilder) -> LibraryResult<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> LibraryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Remote call failed with {}: {}", status, body);
    Err(LibraryError::Remote(error_message(status, &body)))
}

/// Whether the auth service refused the bearer token itself
pub fn is_rejected_token(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Human-readable message from an error response body
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("Remote request failed with status {}", status)
    } else {
        body.to_string()
    }
}
