//! Server error types and their HTTP mapping.

use std::io;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use trackdeck_providers::{ProviderError, ProviderErrorCode};

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failure from the authorization flow or the delegated gateway.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// IO error (listener, shutdown, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// JSON error body returned to the UI layer.
///
/// The code is stable and machine-readable; the message never carries
/// upstream detail.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub code: &'static str,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Provider(err) => provider_response(&err),
            Self::Io(_) | Self::Config { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "internal error",
                    code: "internal_error",
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn provider_response(err: &ProviderError) -> (StatusCode, ErrorBody) {
    match err.code() {
        ProviderErrorCode::Unauthenticated
        | ProviderErrorCode::StateMismatch
        | ProviderErrorCode::TokenExchangeFailed => (
            StatusCode::UNAUTHORIZED,
            ErrorBody {
                error: "authentication required",
                code: err.code().as_str(),
            },
        ),
        ProviderErrorCode::BadRequest => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "invalid request",
                code: err.code().as_str(),
            },
        ),
        ProviderErrorCode::DelegatedCallFailed => {
            // Mirror the upstream status where it makes sense as our own.
            let status = err
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                ErrorBody {
                    error: "catalog request failed",
                    code: err.code().as_str(),
                },
            )
        }
        ProviderErrorCode::NetworkError | ProviderErrorCode::InvalidResponse => (
            StatusCode::BAD_GATEWAY,
            ErrorBody {
                error: "catalog request failed",
                code: err.code().as_str(),
            },
        ),
        ProviderErrorCode::ConfigurationError | ProviderErrorCode::InternalError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody {
                error: "internal error",
                code: err.code().as_str(),
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_maps_to_401() {
        let err = ServerError::from(ProviderError::unauthenticated("no access token"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn delegated_failure_mirrors_upstream_status() {
        let err = ServerError::from(
            ProviderError::delegated("catalog API returned status 404").with_status(404),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn delegated_failure_without_status_is_bad_gateway() {
        let err = ServerError::from(ProviderError::delegated("catalog API failure"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn network_error_is_bad_gateway() {
        let err = ServerError::from(ProviderError::network("connection refused"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let err = ServerError::from(ProviderError::bad_request("search query is empty"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_error_maps_to_500() {
        let err = ServerError::config("missing credentials");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
