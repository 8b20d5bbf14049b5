//! Dashboard, upload and track routes

use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::info;

use super::{error_response, require_session, AppState};
use crate::backend::{LibraryError, LibraryResult};
use crate::core::TracksLib;
use crate::models::{AudioUpload, TrackMetadata};
use crate::utils::validation::{
    check_field_size, check_file_size, parse_bpm, title_from_file_name, validate_audio_file,
    validate_metadata,
};

/// GET /dashboard
#[get("/dashboard")]
pub async fn dashboard(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match TracksLib::summaries(state.library.as_ref(), &session).await {
        Ok(tracks) => HttpResponse::Ok().json(serde_json::json!({ "tracks": tracks })),
        Err(err) => error_response(&err),
    }
}

/// DELETE /tracks/<id>
#[delete("/tracks/{id}")]
pub async fn delete_track(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.library.delete_track(&session, &path).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "msg": "Deleted" })),
        Err(err) => error_response(&err),
    }
}

/// Upload form fields as received
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<AudioUpload>,
    title: String,
    artist: String,
    genre: String,
    bpm: String,
}

impl UploadForm {
    /// Validated file and metadata, defaulting the title to the file name
    fn into_parts(self) -> LibraryResult<(AudioUpload, TrackMetadata)> {
        let file = self
            .file
            .ok_or_else(|| LibraryError::validation("Please select an audio file"))?;
        validate_audio_file(&file)?;

        let title = if self.title.trim().is_empty() {
            title_from_file_name(&file.file_name)
        } else {
            self.title.trim().to_string()
        };
        let metadata = TrackMetadata {
            title,
            artist: self.artist.trim().to_string(),
            genre: self.genre.trim().to_string(),
            bpm: parse_bpm(&self.bpm),
        };
        validate_metadata(&metadata)?;

        Ok((file, metadata))
    }
}

async fn read_upload_form(mut payload: Multipart) -> LibraryResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| LibraryError::validation(format!("Malformed upload: {}", e)))?;
        let disp = field.content_disposition().clone();
        let name = disp.get_name().unwrap_or_default().to_string();

        // unknown fields are counted and dropped
        let keep = matches!(name.as_str(), "file" | "title" | "artist" | "genre" | "bpm");
        let mut bytes = BytesMut::new();
        let mut size = 0;
        while let Some(chunk) = field.next().await {
            let data =
                chunk.map_err(|e| LibraryError::validation(format!("Malformed upload: {}", e)))?;
            size += data.len();
            // stop reading as soon as the limit is passed
            if name == "file" {
                check_file_size(size)?;
            } else {
                check_field_size(&name, size)?;
            }
            if keep {
                bytes.extend_from_slice(&data);
            }
        }

        match name.as_str() {
            "file" => {
                let file_name = disp.get_filename().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .filter(|ct| ct != "application/octet-stream")
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                form.file = Some(AudioUpload::new(file_name, content_type, bytes.freeze()));
            }
            "title" => form.title = text(bytes.freeze()),
            "artist" => form.artist = text(bytes.freeze()),
            "genre" => form.genre = text(bytes.freeze()),
            "bpm" => form.bpm = text(bytes.freeze()),
            _ => {}
        }
    }

    Ok(form)
}

fn text(bytes: Bytes) -> String {
    String::from_utf8_lossy(&bytes).to_string()
}

/// POST /upload
#[post("/upload")]
pub async fn upload_track(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let (file, metadata) = match read_upload_form(payload)
        .await
        .and_then(UploadForm::into_parts)
    {
        Ok(parts) => parts,
        Err(err) => return error_response(&err),
    };

    match state.library.upload_track(&session, file, metadata).await {
        Ok(track) => {
            info!("Uploaded \"{}\" by {}", track.title, track.artist);
            HttpResponse::Created().json(serde_json::json!({ "track": track }))
        }
        Err(err) => error_response(&err),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard)
        .service(delete_track)
        .service(upload_track);
}

#[cfg(test)]
mod tests {
    use super::super::configure;
    use super::super::testing::*;
    use actix_web::{test, App};
    use std::time::Duration;
    use tempfile::TempDir;

    const BOUNDARY: &str = "soundflowboundary";

    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, file_name, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(session: &crate::auth::Session, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/upload")
            .insert_header(bearer(session))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_upload_then_dashboard_then_delete() {
        let dir = TempDir::new().unwrap();
        let state = local_state(&dir, Duration::ZERO).await;
        let session = sign_in(&state).await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let body = multipart_body(
            &[("title", ""), ("artist", "Midnight Driver"), ("genre", "Synthwave"), ("bpm", "118")],
            Some(("Neon Nights.mp3", "audio/mpeg", b"ID3")),
        );
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 201);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["track"]["title"], "Neon Nights");
        assert_eq!(created["track"]["bpm"], 118);
        assert_eq!(created["track"]["duration"], 180);
        assert_eq!(created["track"]["url"], "data:audio/mpeg;base64,SUQz");
        let id = created["track"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/dashboard")
            .insert_header(bearer(&session))
            .to_request();
        let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["tracks"][0]["id"], id.as_str());
        assert_eq!(listed["tracks"][0]["length"], "3:00");

        let req = test::TestRequest::delete()
            .uri(&format!("/tracks/{}", id))
            .insert_header(bearer(&session))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri("/dashboard")
            .insert_header(bearer(&session))
            .to_request();
        let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["tracks"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_upload_rejects_non_audio_and_missing_fields() {
        let dir = TempDir::new().unwrap();
        let state = local_state(&dir, Duration::ZERO).await;
        let session = sign_in(&state).await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let body = multipart_body(
            &[("artist", "A"), ("genre", "G")],
            Some(("cover.png", "image/png", b"png")),
        );
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 400);
        let err: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            err["error"],
            "Invalid file type. Please upload an audio file (MP3, WAV, FLAC)."
        );

        let body = multipart_body(
            &[("title", "T"), ("genre", "G"), ("bpm", "fast")],
            Some(("a.wav", "audio/wav", b"RIFF")),
        );
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 400);
        let err: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(err["error"], "Artist is required");

        let body = multipart_body(&[("title", "T")], None);
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_upload_rejects_oversized_text_fields() {
        let dir = TempDir::new().unwrap();
        let state = local_state(&dir, Duration::ZERO).await;
        let session = sign_in(&state).await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let notes = "x".repeat(1024 * 1024);
        let body = multipart_body(
            &[("title", "T"), ("artist", "A"), ("genre", "G"), ("notes", &notes)],
            Some(("a.mp3", "audio/mpeg", b"ID3")),
        );
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 400);
        let err: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(err["error"], "Field \"notes\" is too large. Max size is 64KB.");

        let title = "t".repeat(65 * 1024);
        let body = multipart_body(
            &[("title", &title), ("artist", "A"), ("genre", "G")],
            Some(("a.mp3", "audio/mpeg", b"ID3")),
        );
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 400);

        // small unknown fields are ignored
        let body = multipart_body(
            &[("title", "T"), ("artist", "A"), ("genre", "G"), ("notes", "hi")],
            Some(("a.mp3", "audio/mpeg", b"ID3")),
        );
        let resp = test::call_service(&app, upload_request(&session, body).to_request()).await;
        assert_eq!(resp.status(), 201);
    }

    #[actix_web::test]
    async fn test_dashboard_requires_session() {
        let dir = TempDir::new().unwrap();
        let state = local_state(&dir, Duration::ZERO).await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/dashboard")
            .insert_header(("Authorization", "Bearer forged"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
