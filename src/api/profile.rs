//! Profile route

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};

use super::{error_response, require_session, AppState};
use crate::core::TracksLib;

/// GET /profile
#[get("")]
pub async fn get_profile(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match TracksLib::library_stats(state.library.as_ref(), &session).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "user": session.user,
            "stats": stats,
            "mode": state.library.mode(),
        })),
        Err(err) => error_response(&err),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_profile);
}
