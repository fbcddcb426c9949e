//! Error types for delegated catalog access.
//!
//! Every failure that crosses the flow or gateway boundary is one of these;
//! raw transport errors never escape.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The callback state was absent or did not match the pending one.
    StateMismatch,
    /// The token endpoint rejected a code exchange or a refresh.
    TokenExchangeFailed,
    /// No access token in the session - the caller should start a login.
    Unauthenticated,
    /// The catalog API returned a failure status.
    DelegatedCallFailed,
    /// Connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// The provider answered with something we could not parse.
    InvalidResponse,
    /// A request was rejected before any network call was made.
    BadRequest,
    /// Missing or invalid configuration.
    ConfigurationError,
    /// Unexpected state, bug.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns true if this error means the session is not (or no longer)
    /// authorized and the user should go through login again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::StateMismatch | Self::TokenExchangeFailed | Self::Unauthenticated
        )
    }

    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateMismatch => "state_mismatch",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::Unauthenticated => "unauthenticated",
            Self::DelegatedCallFailed => "delegated_call_failed",
            Self::NetworkError => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from the authorization flow, the refresh path, or the gateway.
#[derive(Debug, Error)]
pub struct ProviderError {
    /// The error code categorizing this error.
    code: ProviderErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The upstream HTTP status, when one was involved.
    status: Option<u16>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a CSRF state mismatch error.
    pub fn state_mismatch(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::StateMismatch, message)
    }

    /// Creates a token exchange error.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::TokenExchangeFailed, message)
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Unauthenticated, message)
    }

    /// Creates a delegated call error.
    pub fn delegated(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::DelegatedCallFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the upstream HTTP status for this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the upstream HTTP status, if one was involved.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true if the user should go through login again.
    pub fn is_auth_failure(&self) -> bool {
        self.code.is_auth_failure()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
