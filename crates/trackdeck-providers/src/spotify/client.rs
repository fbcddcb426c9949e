//! Low-level Web API transport.
//!
//! [`CatalogClient`] issues one bearer-authenticated request per
//! [`ApiRequest`] and hands every HTTP status back to the gateway, which
//! owns the refresh-and-retry policy. Only transport-level failures
//! (connect, timeout, read) become errors here.

use tracing::debug;

use crate::api::{ApiRequest, ApiResponse, BoxFuture, CatalogApi, HttpMethod};
use crate::error::{ProviderError, ProviderResult};

use super::config::SpotifyConfig;

/// HTTP client for the Spotify Web API.
#[derive(Debug)]
pub struct CatalogClient {
    api_base: String,
    http_client: reqwest::Client,
}

impl CatalogClient {
    /// Creates a catalog client from the provider configuration.
    pub fn new(config: &SpotifyConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint.trim_start_matches('/'))
    }
}

impl CatalogApi for CatalogClient {
    fn execute<'a>(
        &'a self,
        request: &'a ApiRequest,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<ApiResponse>> {
        Box::pin(async move {
            let url = self.url_for(&request.endpoint);

            let mut builder = match request.method {
                HttpMethod::Get => self.http_client.get(&url),
                HttpMethod::Post => self.http_client.post(&url),
            };
            builder = builder.bearer_auth(access_token);

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }

            if let Some(ref body) = request.body {
                let json = serde_json::to_string(body).map_err(|e| {
                    ProviderError::internal(format!("failed to serialize request body: {}", e))
                })?;
                builder = builder
                    .header("Content-Type", "application/json")
                    .body(json);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("catalog request timeout")
                } else if e.is_connect() {
                    ProviderError::network(format!("connection failed: {}", e))
                } else {
                    ProviderError::network(format!("catalog request failed: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            let text = response.text().await.map_err(|e| {
                ProviderError::network(format!("failed to read catalog response: {}", e))
            })?;

            // Error bodies are not always JSON; pass them through as text.
            let body = if text.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
            };

            debug!(
                "catalog API {} {} -> {}",
                request.method, request.endpoint, status
            );
            Ok(ApiResponse { status, body })
        })
    }
}
