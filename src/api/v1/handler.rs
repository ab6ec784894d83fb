use super::error::*;
use super::token::{cleared_cookies, session_cookies};
use crate::application_port::{LoginInput, SessionService};
use crate::domain_model::{AccessClaims, AccessToken, RefreshToken, Subject, TokenPair};
use crate::domain_port::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::{Response, StatusCode, header};
use warp::{self, reject};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: AccessToken,
    pub refresh: RefreshToken,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub subject: Subject,
    pub expires_at: DateTime<Utc>,
}

fn respond(
    status: StatusCode,
    cookies: [String; 2],
    body: Option<String>,
) -> Result<Response<String>, warp::Rejection> {
    let mut builder = Response::builder().status(status);
    for cookie in cookies {
        builder = builder.header(header::SET_COOKIE, cookie);
    }
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    builder
        .body(body.unwrap_or_default())
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)
}

fn token_reply(pair: TokenPair) -> Result<Response<String>, warp::Rejection> {
    let cookies = session_cookies(&pair);
    let body = serde_json::to_string(&TokenResponse {
        token: pair.access_token,
        refresh: pair.refresh_token,
    })
    .map_err(ApiErrorCode::internal)
    .map_err(reject::custom)?;
    respond(StatusCode::OK, cookies, Some(body))
}

pub async fn login(
    body: LoginRequest,
    session_service: Arc<dyn SessionService>,
    clock: Arc<dyn Clock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        username: body.username,
        password: body.password,
    };
    let pair = session_service
        .login(login_input, clock.now())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    token_reply(pair)
}

pub async fn logout(
    token: Option<String>,
    session_service: Arc<dyn SessionService>,
    clock: Arc<dyn Clock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = token.ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
    session_service.logout(&token, clock.now()).await;

    respond(StatusCode::NO_CONTENT, cleared_cookies(), None)
}

pub async fn refresh(
    body: RefreshRequest,
    session_service: Arc<dyn SessionService>,
    clock: Arc<dyn Clock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let refresh_token = body
        .refresh
        .ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
    let pair = session_service
        .refresh(&refresh_token, clock.now())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    token_reply(pair)
}

pub async fn session(claims: AccessClaims) -> Result<impl warp::Reply, warp::Rejection> {
    let response = SessionResponse {
        subject: claims.subject(),
        expires_at: claims.expires_at(),
    };
    Ok(warp::reply::json(&response))
}
