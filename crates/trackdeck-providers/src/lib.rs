//! Delegated catalog access: the OAuth authorization flow, token refresh,
//! and the single-retry API gateway.
//!
//! This crate provides the session/authorization core of trackdeck:
//!
//! - [`AuthFlow`] - the redirect-based authorization-code flow with CSRF
//!   protection
//! - [`DelegatedGateway`] - bearer-authenticated catalog calls with the
//!   refresh-and-retry-once policy
//! - [`TokenEndpoint`] / [`CatalogApi`] - the seams between that logic and
//!   the network, implemented for Spotify in [`spotify`]
//! - [`ProviderError`] - the error taxonomy every failure is converted to
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   begin_login / handle_callback   ┌───────────────┐
//! │   AuthFlow   │──────────────────────────────────▶│ TokenEndpoint │
//! └──────┬───────┘                                   └───────▲───────┘
//!        │ put_tokens                                        │ refresh
//!        ▼                                                   │
//! ┌──────────────┐            call()              ┌──────────┴───────┐
//! │ SessionStore │◀───────────────────────────────│ DelegatedGateway │
//! └──────────────┘                                └──────────┬───────┘
//!                                                            │
//!                                                            ▼
//!                                                     ┌────────────┐
//!                                                     │ CatalogApi │
//!                                                     └────────────┘
//! ```

pub mod api;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod spotify;

// Re-export main types at crate root
pub use api::{ApiRequest, ApiResponse, BoxFuture, CatalogApi, HttpMethod, TokenEndpoint, TokenGrant};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use flow::{AuthFlow, AuthorizeParams};
pub use gateway::DelegatedGateway;
