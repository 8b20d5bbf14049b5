//! authentication api routes cookie or bearer sessions

use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{error_response, require_session, AppState, SESSION_COOKIE};
use crate::utils::auth::SESSION_MAX_AGE;

/// login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// login endpoint
#[post("/login")]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    match state.sessions.sign_in(&body.email, &body.password).await {
        Ok(session) => HttpResponse::Ok()
            .cookie(build_session_cookie(&session.access_token))
            .json(serde_json::json!({
                "accessToken": session.access_token,
                "user": session.user,
                "mode": state.library.mode(),
            })),
        Err(err) => error_response(&err),
    }
}

/// logout endpoint clears the session cookie
#[post("/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match require_session(&req, &state).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if let Err(err) = state.sessions.sign_out(&session).await {
        return error_response(&err);
    }

    let mut cookie = build_session_cookie("");
    cookie.make_removal();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "msg": "Logged out" }))
}

/// current session
#[get("/session")]
pub async fn current_session(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match require_session(&req, &state).await {
        Ok(session) => HttpResponse::Ok().json(serde_json::json!({
            "user": session.user,
            "mode": state.library.mode(),
        })),
        Err(resp) => resp,
    }
}

fn build_session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(SESSION_MAX_AGE as i64))
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(logout).service(current_session);
}
