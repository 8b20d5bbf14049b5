//! HTTP routes for SoundFlow
//!
//! JSON endpoints mirroring the app's pages. Every route except login needs
//! a session, passed as a bearer token or the `access_token` cookie.

pub mod auth;
pub mod insights;
pub mod playlist;
pub mod profile;
pub mod track;

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::error;

use crate::auth::{Session, SessionManager};
use crate::backend::{Backends, LibraryBackend, LibraryError};
use crate::insights::{InsightGenerator, InsightJobs};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "access_token";

/// Shared state handed to every route
pub struct AppState {
    pub library: Arc<dyn LibraryBackend>,
    pub sessions: SessionManager,
    pub insights: InsightJobs,
}

impl AppState {
    pub fn new(backends: Backends, generator: Arc<dyn InsightGenerator>) -> Self {
        Self {
            insights: InsightJobs::new(generator, backends.library.clone()),
            sessions: SessionManager::new(backends.identity),
            library: backends.library,
        }
    }
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth routes
        .service(web::scope("/auth").configure(auth::configure))
        // Playlist routes
        .service(web::scope("/playlists").configure(playlist::configure))
        // Insight routes
        .service(web::scope("/insights").configure(insights::configure))
        // Profile routes
        .service(web::scope("/profile").configure(profile::configure))
        // Dashboard, upload and track routes
        .configure(track::configure);
}

/// Unknown paths land on the dashboard
pub async fn redirect_to_dashboard() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/dashboard"))
        .finish()
}

/// JSON error body with the status matching the failure
pub fn error_response(err: &LibraryError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        LibraryError::Unauthorized => HttpResponse::Unauthorized().json(body),
        LibraryError::NotFound(_) => HttpResponse::NotFound().json(body),
        LibraryError::Validation(_) => HttpResponse::BadRequest().json(body),
        LibraryError::Remote(_) => HttpResponse::BadGateway().json(body),
        LibraryError::Storage(_) => {
            error!("{}", err);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

/// Token from the `Authorization` header, else the session cookie
fn access_token(req: &HttpRequest) -> Option<String> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().unwrap_or("").trim();
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    req.cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Session of the caller, or the 401 response to send back
pub async fn require_session(
    req: &HttpRequest,
    state: &AppState,
) -> Result<Session, HttpResponse> {
    let token = access_token(req).ok_or_else(|| error_response(&LibraryError::Unauthorized))?;
    state
        .sessions
        .session_from_token(&token)
        .await
        .map_err(|err| error_response(&err))
}
