//! Token endpoint client for the Spotify accounts service.
//!
//! Implements the two form-encoded grant shapes the flow needs:
//!
//! - `grant_type=authorization_code` with `code` and `redirect_uri`
//! - `grant_type=refresh_token` with `refresh_token`
//!
//! Both are authenticated with a Basic credential built from the client id
//! and secret; the secret never travels in the form body.

use tracing::{debug, info};

use crate::api::{BoxFuture, TokenEndpoint, TokenGrant};
use crate::error::{ProviderError, ProviderResult};

use super::config::SpotifyConfig;

/// Client for the accounts-service token endpoint.
#[derive(Debug)]
pub struct TokenClient {
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http_client: reqwest::Client,
}

impl TokenClient {
    /// Creates a token client from the provider configuration.
    pub fn new(config: &SpotifyConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Self {
            token_url: config.token_url.clone(),
            client_id: config.credentials.client_id.clone(),
            client_secret: config.credentials.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            http_client,
        }
    }

    /// POSTs one grant request and parses the token response.
    async fn post_grant(&self, params: &[(&str, &str)], what: &str) -> ProviderResult<TokenGrant> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network(format!("{} request timeout", what))
                } else {
                    ProviderError::network(format!("{} request failed: {}", what, e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::token_exchange(format!(
                "{} failed ({}): {}",
                what, status, body
            ))
            .with_status(status.as_u16()));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })?;

        Ok(TokenGrant {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
        })
    }
}

impl TokenEndpoint for TokenClient {
    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        Box::pin(async move {
            let params = [
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ];
            let grant = self.post_grant(&params, "code exchange").await?;
            info!("exchanged authorization code for tokens");
            Ok(grant)
        })
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        Box::pin(async move {
            let params = [
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ];
            let grant = self.post_grant(&params, "token refresh").await?;
            debug!("obtained refreshed access token");
            Ok(grant)
        })
    }
}

/// Response from the accounts-service token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Present in the JSON but not used: expiry is discovered reactively.
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::config::ClientCredentials;

    fn test_config() -> SpotifyConfig {
        SpotifyConfig::new(ClientCredentials::new(
            "0123456789abcdef0123456789abcdef",
            "test-secret",
        ))
    }

    #[test]
    fn client_creation() {
        let client = TokenClient::new(&test_config());
        assert_eq!(client.token_url, "https://accounts.spotify.com/api/token");
        assert_eq!(client.redirect_uri, "http://localhost:8888/callback");
    }

    #[test]
    fn parse_code_exchange_response() {
        let json = r#"{
            "access_token": "BQabc123",
            "token_type": "Bearer",
            "scope": "playlist-modify-public playlist-modify-private",
            "expires_in": 3600,
            "refresh_token": "AQdef456"
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "BQabc123");
        assert_eq!(response.refresh_token, Some("AQdef456".to_string()));
    }

    #[test]
    fn parse_refresh_response_without_rotation() {
        let json = r#"{
            "access_token": "BQnew789",
            "token_type": "Bearer",
            "expires_in": 3600
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "BQnew789");
        assert!(response.refresh_token.is_none());
    }

    #[test]
    fn parse_response_without_access_token_fails() {
        let json = r#"{ "token_type": "Bearer" }"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }
}
