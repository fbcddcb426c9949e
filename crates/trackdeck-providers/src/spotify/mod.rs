//! Spotify provider implementation.
//!
//! Concrete clients for the Spotify accounts service and Web API, plus the
//! request builders for the two delegated operations the service exposes.
//!
//! # Authorization flow
//!
//! 1. The server redirects the browser to the accounts service with a
//!    fresh CSRF state
//! 2. The user grants access; the accounts service redirects back with a
//!    code and the echoed state
//! 3. [`TokenClient`] exchanges the code for an access and refresh token,
//!    authenticated with the app's Basic credential
//! 4. Delegated calls go out through the gateway with the access token;
//!    a 401 triggers one refresh and one retry
//!
//! # Example
//!
//! ```ignore
//! use trackdeck_providers::spotify::{ClientCredentials, SpotifyConfig, TokenClient};
//!
//! let credentials = ClientCredentials::from_env()?;
//! let config = SpotifyConfig::new(credentials)
//!     .with_redirect_uri("https://app.example.com/callback");
//! config.validate()?;
//!
//! let tokens = TokenClient::new(&config);
//! ```

mod catalog;
mod client;
mod config;
mod oauth;

pub use catalog::{NewPlaylist, SearchKind, SearchQuery, current_user_request};
pub use client::CatalogClient;
pub use config::{
    ClientCredentials, DEFAULT_API_BASE, DEFAULT_AUTHORIZE_URL, DEFAULT_TOKEN_URL, SpotifyConfig,
};
pub use oauth::TokenClient;
