use super::cookie::{CookiePolicy, REFRESH_COOKIE};
use super::handler;
use crate::application_port::SessionValidator;
use crate::domain_model::{NewUser, SubjectId};
use crate::server::Server;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;
use warp::http::HeaderMap;

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let session = with_session(server.session_validator.clone());
    let cookies = server.cookie_policy.clone();

    // Paths are matched before methods so an unknown path stays a 404.

    let index = warp::path::end()
        .and(warp::get())
        .and(session.clone())
        .and(with(server.session_service.clone()))
        .and_then(handler::index);

    let callback = warp::path("callback")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handler::CallbackQuery>())
        .and(with(server.session_service.clone()))
        .and(with_value(cookies.clone()))
        .and_then(handler::callback);

    let user_info = warp::path("userinfo")
        .and(warp::path::end())
        .and(warp::get())
        .and(session.clone())
        .and(with(server.session_service.clone()))
        .and_then(handler::user_info);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::get())
        .and(session.clone())
        .and(with(server.session_service.clone()))
        .and(with_value(cookies.clone()))
        .and_then(handler::logout);

    let login = warp::path!("api" / "login")
        .and(warp::post())
        .and(json_or_form::<handler::LoginRequest>())
        .and(with(server.session_service.clone()))
        .and(with_value(cookies))
        .and_then(handler::login);

    let refresh = warp::path!("api" / "refresh")
        .and(warp::get())
        .and(session)
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE))
        .and(with(server.session_service.clone()))
        .and_then(handler::refresh);

    let register = warp::path!("api" / "register")
        .and(warp::post())
        .and(json_or_form::<NewUser>())
        .and(with(server.session_service.clone()))
        .and_then(handler::register);

    index
        .or(callback)
        .or(user_info)
        .or(logout)
        .or(login)
        .or(refresh)
        .or(register)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_value(
    cookies: CookiePolicy,
) -> impl Filter<Extract = (CookiePolicy,), Error = Infallible> + Clone {
    warp::any().map(move || cookies.clone())
}

/// Derives the caller from the configured bearer header. Never rejects:
/// a missing or unusable token just means an anonymous request.
fn with_session(
    validator: Arc<dyn SessionValidator>,
) -> impl Filter<Extract = (Option<SubjectId>,), Error = Infallible> + Clone {
    warp::header::headers_cloned().map(move |headers: HeaderMap| {
        let value = headers
            .get(validator.header_name())
            .and_then(|value| value.to_str().ok());
        validator.derive_subject(value)
    })
}

fn json_or_form<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send + 'static,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(
        warp::body::json::<T>()
            .or(warp::body::form::<T>())
            .unify(),
    )
}
