//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps routing, access, and store errors to HTTP status codes with a JSON
//! body of the form `{"error": {"code", "message"}}`. Internal error details
//! are logged, never returned.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use depot_core::{AccessError, RoutingError};
use depot_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `WWW-Authenticate` challenge sent with every 401.
pub const BASIC_CHALLENGE: &str = "Basic realm=\"depot\"";

/// Methods accepted by a repository.
pub const REPOSITORY_METHODS: &str = "GET, HEAD, PUT";

/// Methods accepted by a group.
pub const GROUP_METHODS: &str = "GET, HEAD";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown container, unrouted path, or missing file (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Path escapes the repository root, or the upload was aborted (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Attempt to overwrite a released artifact (400).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials are required (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but not permitted (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The method is not supported on this container (405).
    #[error("method not allowed: {message}")]
    MethodNotAllowed {
        /// Human-readable message.
        message: String,
        /// Value of the `Allow` header.
        allow: &'static str,
    },

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::MethodNotAllowed { .. } => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::MethodNotAllowed { message, .. } => message.clone(),
            Self::NotFound(m)
            | Self::BadRequest(m)
            | Self::Conflict(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m) => m.clone(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        let mut response = (status, Json(body)).into_response();

        match &self {
            Self::Unauthorized(_) => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(BASIC_CHALLENGE),
                );
            }
            Self::MethodNotAllowed { allow, .. } => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static(*allow));
            }
            _ => {}
        }
        response
    }
}

impl From<RoutingError> for AppError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::UnknownContainer(_) | RoutingError::NoRoute { .. } => {
                Self::NotFound(err.to_string())
            }
            RoutingError::OutsideRoot { .. } => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated { .. } => Self::Unauthorized(err.to_string()),
            AccessError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            AccessError::Unsupported { .. } => Self::MethodNotAllowed {
                message: err.to_string(),
                allow: GROUP_METHODS,
            },
        }
    }
}

/// Store errors carry absolute filesystem paths; only the 500 path keeps
/// them, and that message is never sent to the client.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound("artifact not found".to_string()),
            StoreError::Conflict(_) => {
                Self::Conflict("cannot overwrite release artifact".to_string())
            }
            StoreError::Interrupted(reason) => {
                Self::BadRequest(format!("upload interrupted: {reason}"))
            }
            StoreError::Io { .. } => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::Verb;
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    #[test]
    fn routing_errors_map_to_404_or_400() {
        let (status, _) = AppError::from(RoutingError::UnknownContainer("x".into())).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let err = AppError::from(RoutingError::NoRoute {
            container: "repo".into(),
            path: "/org".into(),
        });
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);

        let err = AppError::from(RoutingError::OutsideRoot {
            container: "repo".into(),
            path: "/../etc".into(),
        });
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "BAD_REQUEST"));
    }

    #[test]
    fn access_errors_map_to_401_403_405() {
        let err = AppError::from(AccessError::Unauthenticated {
            container: "repo".into(),
        });
        assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);

        let err = AppError::from(AccessError::Forbidden {
            user: "bob".into(),
            container: "repo".into(),
            verb: Verb::Write,
        });
        assert_eq!(err.status_and_code().0, StatusCode::FORBIDDEN);

        let err = AppError::from(AccessError::Unsupported {
            container: "all".into(),
            verb: Verb::Write,
        });
        assert_eq!(err.status_and_code().0, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn store_errors_hide_paths() {
        let err = AppError::from(StoreError::NotFound(PathBuf::from("/srv/secret/a.jar")));
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
        assert!(!err.to_string().contains("/srv/secret"));

        let err = AppError::from(StoreError::Conflict(PathBuf::from("/srv/secret/a.jar")));
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "CONFLICT"));
        assert!(!err.to_string().contains("/srv/secret"));

        let err = AppError::from(StoreError::Interrupted("reset".into()));
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);

        let err = AppError::from(StoreError::Io {
            path: PathBuf::from("/srv/secret"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let response = AppError::Unauthorized("login".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            BASIC_CHALLENGE
        );
    }

    #[test]
    fn method_not_allowed_carries_allow() {
        let response = AppError::MethodNotAllowed {
            message: "no".into(),
            allow: REPOSITORY_METHODS,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, HEAD, PUT");
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response = AppError::Internal("disk on fire at /srv".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("/srv"));
    }
}
