use super::cookie::CookiePolicy;
use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::header::SET_COOKIE;
use warp::http::{HeaderValue, Uri};
use warp::reply::{Reply, Response};
use warp::{self, reject};

const LOGOUT_PATH: &str = "/logout";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Epoch milliseconds.
    pub expires_date: i64,
}

impl TokenResponse {
    fn new(token: &AccessToken, expires_at: DateTime<Utc>) -> Self {
        TokenResponse {
            token: token.0.clone(),
            expires_date: expires_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WhoAmIResponse {
    username: String,
    logout: &'static str,
}

fn with_cookie(mut response: Response, cookie: String) -> Result<Response, warp::Rejection> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(response)
}

fn logged_in(result: LoginResult, cookies: &CookiePolicy) -> Result<Response, warp::Rejection> {
    let response =
        warp::reply::json(&TokenResponse::new(&result.access_token, result.expires_at)).into_response();
    match &result.refresh_token {
        Some(refresh_token) => with_cookie(response, cookies.set_refresh_token(refresh_token)),
        None => Ok(response),
    }
}

pub async fn index(
    subject: Option<SubjectId>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    if let Some(subject) = subject {
        let response = WhoAmIResponse {
            username: subject.0,
            logout: LOGOUT_PATH,
        };
        return Ok(warp::reply::json(&response).into_response());
    }

    match session_service.login_page_url() {
        Some(url) => {
            let uri = url
                .parse::<Uri>()
                .map_err(ApiErrorCode::internal)
                .map_err(reject::custom)?;
            Ok(warp::redirect::found(uri).into_response())
        }
        None => Ok(warp::reply::json(&serde_json::json!({ "login": "/api/login" })).into_response()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    session_service: Arc<dyn SessionService>,
    cookies: CookiePolicy,
) -> Result<Response, warp::Rejection> {
    let login_input = LoginInput {
        login: body.login,
        password: body.password,
    };
    let result = session_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    logged_in(result, &cookies)
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

pub async fn callback(
    query: CallbackQuery,
    session_service: Arc<dyn SessionService>,
    cookies: CookiePolicy,
) -> Result<Response, warp::Rejection> {
    let result = session_service
        .login_with_code(&query.code)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    logged_in(result, &cookies)
}

pub async fn refresh(
    subject: Option<SubjectId>,
    refresh_cookie: Option<String>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    let result = session_service
        .refresh(subject.as_ref(), refresh_cookie.as_deref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = TokenResponse::new(&result.access_token, result.expires_at);
    Ok(warp::reply::json(&response).into_response())
}

pub async fn user_info(
    subject: Option<SubjectId>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    let profile = session_service
        .user_info(subject.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = WhoAmIResponse {
        username: profile.display_name(),
        logout: LOGOUT_PATH,
    };
    Ok(warp::reply::json(&response).into_response())
}

pub async fn logout(
    subject: Option<SubjectId>,
    session_service: Arc<dyn SessionService>,
    cookies: CookiePolicy,
) -> Result<Response, warp::Rejection> {
    session_service
        .logout(subject.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = warp::redirect::found(Uri::from_static("/")).into_response();
    with_cookie(response, cookies.clear_refresh_token())
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    redirect: &'static str,
}

pub async fn register(
    body: NewUser,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    session_service
        .register(body)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&RegisterResponse { redirect: "/" }).into_response())
}
