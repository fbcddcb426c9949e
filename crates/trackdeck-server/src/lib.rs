//! HTTP surface for trackdeck.
//!
//! This crate provides the inbound side of the service:
//!
//! - `/login` and `/callback` drive the OAuth authorization flow
//! - `/search` and `/playlist` proxy delegated catalog actions
//! - cookies carry the session; there is no server-side session table
//!
//! # Example
//!
//! ```rust,no_run
//! use trackdeck_providers::spotify::{ClientCredentials, SpotifyConfig};
//! use trackdeck_server::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ClientCredentials::from_env()?;
//!     let provider = SpotifyConfig::new(credentials);
//!     serve(ServerConfig::default(), &provider).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod cookies;
mod error;
mod routes;

pub use config::{ServerConfig, default_bind_addr};
pub use cookies::{
    ACCESS_COOKIE, CookieSession, REFRESH_COOKIE, STATE_COOKIE, parse_cookie_header,
};
pub use error::{ErrorBody, ServerError, ServerResult};
pub use routes::{AppState, router, serve};
