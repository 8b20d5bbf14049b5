//! Insight routes

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};

use super::{error_response, require_session, AppState};
use crate::core::TracksLib;
use crate::insights::LOADING_STEPS;

/// GET /insights
#[get("")]
pub async fn list_tracks(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match TracksLib::summaries(state.library.as_ref(), &session).await {
        Ok(tracks) => HttpResponse::Ok().json(serde_json::json!({
            "tracks": tracks,
            "steps": LOADING_STEPS,
        })),
        Err(err) => error_response(&err),
    }
}

/// POST /insights/<track_id> starts a job
#[post("/{track_id}")]
pub async fn generate(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.insights.request(&session, &path).await {
        Ok(status) => HttpResponse::Accepted().json(status),
        Err(err) => error_response(&err),
    }
}

/// GET /insights/jobs/<job_id>
#[get("/jobs/{job_id}")]
pub async fn job_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_session(&req, &state).await {
        return resp;
    }

    match state.insights.status(&path) {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "Job not found" })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_tracks).service(generate).service(job_status);
}

#[cfg(test)]
mod tests {
    use super::super::configure;
    use super::super::testing::*;
    use crate::models::{AudioUpload, TrackMetadata};
    use actix_web::{test, App};
    use bytes::Bytes;
    use std::time::Duration;
    use tempfile::TempDir;

    #[actix_web::test]
    async fn test_generate_and_poll() {
        let dir = TempDir::new().unwrap();
        let state = local_state(&dir, Duration::from_millis(50)).await;
        let session = sign_in(&state).await;
        let track = state
            .library
            .upload_track(
                &session,
                AudioUpload::new("a.mp3", "audio/mpeg", Bytes::from_static(b"a")),
                TrackMetadata {
                    title: "Neon Nights".to_string(),
                    artist: "Midnight Driver".to_string(),
                    genre: "Synthwave".to_string(),
                    bpm: 118,
                },
            )
            .await
            .unwrap();
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/insights/{}", track.id))
            .insert_header(bearer(&session))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 202);
        let started: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(started["status"], "running");
        assert_eq!(started["step_label"], "Extracting audio features...");
        let job_id = started["id"].as_str().unwrap().to_string();

        let mut finished = serde_json::Value::Null;
        for _ in 0..100 {
            let req = test::TestRequest::get()
                .uri(&format!("/insights/jobs/{}", job_id))
                .insert_header(bearer(&session))
                .to_request();
            let status: serde_json::Value = test::call_and_read_body_json(&app, req).await;
            if status["status"] != "running" {
                finished = status;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(finished["status"], "completed");
        assert_eq!(finished["progress"], 100);
        assert_eq!(
            finished["track"]["insights"]["commercialViability"],
            "8/10 - Strong potential for advertising and sports highlights."
        );

        let req = test::TestRequest::get()
            .uri("/insights")
            .insert_header(bearer(&session))
            .to_request();
        let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["tracks"][0]["insights_ready"], true);
        assert_eq!(listed["steps"].as_array().unwrap().len(), 5);
    }

    #[actix_web::test]
    async fn test_unknown_track_and_job() {
        let dir = TempDir::new().unwrap();
        let state = local_state(&dir, Duration::ZERO).await;
        let session = sign_in(&state).await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/insights/missing")
            .insert_header(bearer(&session))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::get()
            .uri("/insights/jobs/missing")
            .insert_header(bearer(&session))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
