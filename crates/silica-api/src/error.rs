//! HTTP error mapping.
//!
//! Every error body has the shape `{"errors": [{"title": "..."}]}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use silica_core::ErrorResponse;

/// Shared title for unknown and malformed result identifiers.
pub const LINK_INVALID: &str = "Link outdated or invalid!";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<silica_core::Error> for ApiError {
    fn from(err: silica_core::Error) -> Self {
        use silica_core::Error;

        match err {
            Error::Input(_) | Error::Validation { .. } | Error::Execution(_) => {
                ApiError::BadRequest(err.to_string())
            }
            Error::NotFound(_) | Error::MalformedIdentifier(_) => {
                ApiError::NotFound(LINK_INVALID.to_string())
            }
            Error::Launch(msg) => ApiError::Internal(msg),
            other => {
                warn!(error = %other, "api: internal error");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse::single(title))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_core::Error;

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Error::Input("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(Error::validation("setKmer", "too small")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::MalformedIdentifier("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(Error::Launch("Binary silica not found!".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_and_malformed_share_title() {
        let a = ApiError::from(Error::NotFound("abc".into()));
        let b = ApiError::from(Error::MalformedIdentifier("abc-zz".into()));
        match (a, b) {
            (ApiError::NotFound(x), ApiError::NotFound(y)) => {
                assert_eq!(x, LINK_INVALID);
                assert_eq!(x, y);
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
