//! Playlist routes

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::info;

use super::{error_response, require_session, AppState};
use crate::core::PlaylistLib;
use crate::models::PlaylistUpdate;
use crate::utils::validation::require_field;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetPlaylistQuery {
    /// Narrows the tracks that can be added
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: String,
}

/// GET /playlists
#[get("")]
pub async fn get_playlists(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.library.get_playlists(&session).await {
        Ok(playlists) => HttpResponse::Ok().json(serde_json::json!({ "playlists": playlists })),
        Err(err) => error_response(&err),
    }
}

/// POST /playlists
#[post("")]
pub async fn create_playlist(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreatePlaylistRequest>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if let Err(err) = require_field("Playlist name", &body.name) {
        return error_response(&err);
    }

    let name = body.name.trim();
    match state
        .library
        .create_playlist(&session, name, body.description.as_deref())
        .await
    {
        Ok(playlist) => {
            info!("Created playlist \"{}\"", playlist.name);
            HttpResponse::Created().json(serde_json::json!({ "playlist": playlist }))
        }
        Err(err) => error_response(&err),
    }
}

/// GET /playlists/<id>
#[get("/{id}")]
pub async fn get_playlist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<GetPlaylistQuery>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match PlaylistLib::detail(state.library.as_ref(), &session, &path, &query.q).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(err) => error_response(&err),
    }
}

/// PUT /playlists/<id>
#[put("/{id}")]
pub async fn update_playlist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PlaylistUpdate>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let mut updates = body.into_inner();
    if let Some(name) = updates.name.take() {
        if let Err(err) = require_field("Playlist name", &name) {
            return error_response(&err);
        }
        updates.name = Some(name.trim().to_string());
    }

    match state.library.update_playlist(&session, &path, updates).await {
        Ok(playlist) => HttpResponse::Ok().json(serde_json::json!({ "playlist": playlist })),
        Err(err) => error_response(&err),
    }
}

/// DELETE /playlists/<id>
#[delete("/{id}")]
pub async fn remove_playlist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.library.delete_playlist(&session, &path).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "msg": "Done" })),
        Err(err) => error_response(&err),
    }
}

/// POST /playlists/<id>/tracks
#[post("/{id}/tracks")]
pub async fn add_track_to_playlist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AddTrackRequest>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match PlaylistLib::add_track(state.library.as_ref(), &session, &path, &body.track_id).await {
        Ok(playlist) => HttpResponse::Ok().json(serde_json::json!({ "playlist": playlist })),
        Err(err) => error_response(&err),
    }
}

/// DELETE /playlists/<id>/tracks/<track_id>
#[delete("/{id}/tracks/{track_id}")]
pub async fn remove_track_from_playlist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let (id, track_id) = path.into_inner();
    match PlaylistLib::remove_track(state.library.as_ref(), &session, &id, &track_id).await {
        Ok(playlist) => HttpResponse::Ok().json(serde_json::json!({ "playlist": playlist })),
        Err(err) => error_response(&err),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_playlists)
        .service(create_playlist)
        .service(get_playlist)
        .service(update_playlist)
        .service(remove_playlist)
        .service(add_track_to_playlist)
        .service(remove_track_from_playlist);
}
