//! Seam traits between the flow/gateway logic and the network.
//!
//! Both traits return [`BoxFuture`]s so concrete reqwest-backed clients and
//! in-process test doubles are interchangeable behind `dyn` handles.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::ProviderResult;

/// A boxed future, as returned by the seam traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One grant's worth of tokens from the provider's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// The access token for delegated API requests.
    pub access_token: String,
    /// A refresh token, when the provider issued or rotated one.
    pub refresh_token: Option<String>,
}

/// Client for the provider's token endpoint.
///
/// Implementations authenticate both grant shapes with the client's own
/// Basic credential; the browser never sees the client secret.
pub trait TokenEndpoint: Send + Sync {
    /// Exchanges an authorization code for a token grant
    /// (`grant_type=authorization_code`).
    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>>;

    /// Exchanges a refresh token for a new grant
    /// (`grant_type=refresh_token`).
    ///
    /// One attempt per invocation; implementations never retry themselves.
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>>;
}

/// HTTP method for a delegated API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One outbound request to the delegated catalog API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Endpoint path relative to the API base, e.g. `search`.
    pub endpoint: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON request body, for POST requests.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a GET request for the given endpoint path.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request for the given endpoint path.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON request body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The response to a delegated API request.
///
/// The body passes through as raw JSON; result shaping belongs to the
/// consumer, not this subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for a 401, the refresh trigger.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Transport for the delegated catalog API.
///
/// `execute` issues exactly one bearer-authenticated request. HTTP failure
/// statuses come back as responses so the gateway owns the retry policy;
/// only transport-level failures (connect, timeout, read) are errors.
pub trait CatalogApi: Send + Sync {
    /// Issues one request with `Authorization: Bearer <access_token>`.
    fn execute<'a>(
        &'a self,
        request: &'a ApiRequest,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<ApiResponse>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builders() {
        let request = ApiRequest::get("search")
            .with_query("q", "night drive")
            .with_query("limit", "12");

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.endpoint, "search");
        assert_eq!(request.query.len(), 2);
        assert!(request.body.is_none());
    }

    #[test]
    fn post_request_with_body() {
        let request =
            ApiRequest::post("users/u1/playlists").with_body(serde_json::json!({"name": "mix"}));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body, Some(serde_json::json!({"name": "mix"})));
    }

    #[test]
    fn response_status_predicates() {
        let ok = ApiResponse {
            status: 201,
            body: serde_json::Value::Null,
        };
        assert!(ok.is_success());
        assert!(!ok.is_unauthorized());

        let expired = ApiResponse {
            status: 401,
            body: serde_json::Value::Null,
        };
        assert!(!expired.is_success());
        assert!(expired.is_unauthorized());
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }
}
