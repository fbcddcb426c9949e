//! Spotify provider configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::flow::AuthorizeParams;

/// Default accounts-service authorize endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Default accounts-service token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Default Web API base.
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// OAuth 2.0 client credential for the application.
///
/// Registered in the Spotify developer dashboard; the secret authenticates
/// the app against the token endpoint and is never sent to the browser.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// The application's client id.
    pub client_id: String,
    /// The application's client secret.
    pub client_secret: String,
}

/// Structure of a credentials JSON file (`{"client_id": ..., "client_secret": ...}`).
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Creates a new client credential.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads the credential from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, String> {
        let client_id = std::env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| "SPOTIFY_CLIENT_ID is not set".to_string())?;
        let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| "SPOTIFY_CLIENT_SECRET is not set".to_string())?;
        Ok(Self::new(client_id, client_secret))
    }

    /// Loads the credential from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("failed to read credentials file: {}", e))?;
        Self::from_json(&content)
    }

    /// Parses the credential from a JSON string with `client_id` and
    /// `client_secret` at the root level.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;
        Ok(Self::new(file.client_id, file.client_secret))
    }

    /// Validates that the credential appears to be correctly formatted.
    ///
    /// Spotify client ids are 32-character hex strings.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if self.client_id.len() != 32 || !self.client_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("client_id should be a 32-character hex string");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Spotify provider.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// OAuth client credential.
    pub credentials: ClientCredentials,

    /// The accounts-service authorize endpoint.
    pub authorize_url: String,

    /// The accounts-service token endpoint.
    pub token_url: String,

    /// Base URL of the Web API.
    pub api_base: String,

    /// Redirect target for the authorization callback.
    ///
    /// Must exactly match the value registered with the provider or the
    /// authorize request is rejected.
    pub redirect_uri: String,

    /// OAuth scopes to request.
    ///
    /// Defaults to the set needed for playlist mutation.
    pub scopes: Vec<String>,

    /// Request timeout for provider and catalog calls.
    pub timeout: Duration,

    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl SpotifyConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default scopes: enough to create and modify playlists.
    pub const DEFAULT_SCOPES: &'static [&'static str] =
        &["playlist-modify-public", "playlist-modify-private"];

    /// Creates a new configuration with the given credential.
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("trackdeck/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the redirect URI.
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    /// Sets the scopes to request.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the authorize endpoint.
    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    /// Sets the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the Web API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the authorize parameters for the login flow.
    pub fn authorize_params(&self) -> AuthorizeParams {
        AuthorizeParams {
            authorize_url: self.authorize_url.clone(),
            client_id: self.credentials.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if !self.redirect_uri.starts_with("http://") && !self.redirect_uri.starts_with("https://") {
            return Err("redirect_uri must be an absolute http(s) URL".to_string());
        }

        for (name, url) in [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("api_base", &self.api_base),
        ] {
            if url.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> ClientCredentials {
        ClientCredentials::new("0123456789abcdef0123456789abcdef", "test-secret")
    }

    #[test]
    fn credentials_validation() {
        assert!(test_credentials().validate().is_ok());

        let empty_id = ClientCredentials::new("", "secret");
        assert!(empty_id.validate().is_err());

        let bad_id = ClientCredentials::new("not-hex", "secret");
        assert!(bad_id.validate().is_err());

        let empty_secret = ClientCredentials::new("0123456789abcdef0123456789abcdef", "");
        assert!(empty_secret.validate().is_err());
    }

    #[test]
    fn credentials_from_json() {
        let json = r#"{
            "client_id": "0123456789abcdef0123456789abcdef",
            "client_secret": "shh"
        }"#;

        let creds = ClientCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "0123456789abcdef0123456789abcdef");
        assert_eq!(creds.client_secret, "shh");
    }

    #[test]
    fn credentials_from_json_malformed() {
        let result = ClientCredentials::from_json("not json");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("parse"));
    }

    #[test]
    fn config_defaults() {
        let config = SpotifyConfig::new(test_credentials());
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(
            config.scopes,
            vec![
                "playlist-modify-public".to_string(),
                "playlist-modify-private".to_string()
            ]
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_validation() {
        let config = SpotifyConfig::new(test_credentials());
        assert!(config.validate().is_ok());

        let no_scopes = SpotifyConfig::new(test_credentials()).with_scopes(vec![]);
        assert!(no_scopes.validate().is_err());

        let bad_redirect = SpotifyConfig::new(test_credentials()).with_redirect_uri("callback");
        assert!(bad_redirect.validate().is_err());
    }

    #[test]
    fn config_builder_methods() {
        let config = SpotifyConfig::new(test_credentials())
            .with_redirect_uri("https://app.example.com/callback")
            .with_token_url("http://127.0.0.1:9999/api/token")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.redirect_uri, "https://app.example.com/callback");
        assert_eq!(config.token_url, "http://127.0.0.1:9999/api/token");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn authorize_params_mirror_the_config() {
        let config = SpotifyConfig::new(test_credentials())
            .with_redirect_uri("https://app.example.com/callback");
        let params = config.authorize_params();

        assert_eq!(params.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(params.client_id, config.credentials.client_id);
        assert_eq!(params.redirect_uri, "https://app.example.com/callback");
        assert_eq!(params.scopes, config.scopes);
    }
}
