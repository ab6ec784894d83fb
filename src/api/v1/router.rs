use super::error::*;
use super::handler;
use super::token::{ACCESS_COOKIE, extract_token};
use crate::application_port::SessionService;
use crate::domain_model::AccessClaims;
use crate::domain_port::Clock;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::HeaderMap;
use warp::http::header::AUTHORIZATION;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and(with(server.clock.clone()))
        .and_then(handler::login);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(presented_token())
        .and(with(server.session_service.clone()))
        .and(with(server.clock.clone()))
        .and_then(handler::logout);

    let refresh = warp::path("refresh")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and(with(server.clock.clone()))
        .and_then(handler::refresh);

    let session = warp::path("session")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_authorization(
            server.session_service.clone(),
            server.clock.clone(),
        ))
        .and_then(handler::session);

    // Paths before methods, so an unknown path is a 404 rather than a 405.
    warp::path("api").and(login.or(logout).or(refresh).or(session))
}

/// `routes` with rejections turned into JSON error responses.
pub fn service(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    routes(server).recover(recover_error)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn presented_token() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::header::headers_cloned()
        .and(warp::cookie::optional::<String>(ACCESS_COOKIE))
        .map(|headers: HeaderMap, cookie: Option<String>| {
            match headers.get(AUTHORIZATION).map(|value| value.to_str()) {
                Some(Ok(authorization)) => extract_token(Some(authorization), cookie.as_deref()),
                // Present but not visible ASCII: malformed, no cookie fallback.
                Some(Err(_)) => None,
                None => extract_token(None, cookie.as_deref()),
            }
        })
}

fn with_authorization(
    session_service: Arc<dyn SessionService>,
    clock: Arc<dyn Clock>,
) -> impl Filter<Extract = (AccessClaims,), Error = warp::Rejection> + Clone {
    presented_token().and_then(move |token: Option<String>| {
        let session_service = session_service.clone();
        let clock = clock.clone();
        async move {
            let token = token.ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
            session_service
                .authorize(&token, clock.now())
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
