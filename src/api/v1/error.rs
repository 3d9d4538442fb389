use crate::application_port::*;
use crate::logger::*;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

/// Every failure leaves the service as a bare status code. Details stay in
/// the server log.
pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let status = if let Some(code) = err.find::<ApiErrorCode>() {
        code.status()
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<reject::InvalidQuery>().is_some()
        || err.find::<reject::MissingHeader>().is_some()
    {
        StatusCode::BAD_REQUEST
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    } else if err.find::<reject::LengthRequired>().is_some() {
        StatusCode::LENGTH_REQUIRED
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        StatusCode::METHOD_NOT_ALLOWED
    } else {
        warn!("Unhandled rejection: {:?}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok(warp::reply::with_status(warp::reply(), status))
}

#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unauthenticated => ApiErrorCode::Unauthenticated,
            e @ SessionError::Upstream(_) => ApiErrorCode::internal(e),
            e @ SessionError::MalformedToken => ApiErrorCode::internal(e),
            e @ SessionError::Store(_) => ApiErrorCode::internal(e),
        }
    }
}
