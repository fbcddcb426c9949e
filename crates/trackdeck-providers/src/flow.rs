//! The redirect-based authorization flow.
//!
//! A session moves through three states: unauthenticated (no tokens, no
//! pending state), pending callback (a CSRF state has been issued), and
//! authenticated (the store holds a token pair). [`AuthFlow::begin_login`]
//! issues the redirect, [`AuthFlow::handle_callback`] validates the return
//! leg and performs the code exchange.

use std::sync::Arc;

use tracing::{debug, info, warn};

use trackdeck_core::nonce::{STATE_NONCE_LEN, nonce};
use trackdeck_core::session::SessionStore;

use crate::api::TokenEndpoint;
use crate::error::{ProviderError, ProviderResult};

/// Where to send the browser for authorization, and with what identity.
#[derive(Debug, Clone)]
pub struct AuthorizeParams {
    /// The provider's authorize endpoint.
    pub authorize_url: String,
    /// The OAuth client id (public, unlike the secret).
    pub client_id: String,
    /// Redirect target; must exactly match the value registered with the
    /// provider.
    pub redirect_uri: String,
    /// Scopes to request, joined with spaces in the redirect.
    pub scopes: Vec<String>,
}

/// Drives the authorization-code flow against a [`TokenEndpoint`].
pub struct AuthFlow {
    params: AuthorizeParams,
    tokens: Arc<dyn TokenEndpoint>,
}

impl AuthFlow {
    /// Creates a flow for the given authorize parameters and token endpoint.
    pub fn new(params: AuthorizeParams, tokens: Arc<dyn TokenEndpoint>) -> Self {
        Self { params, tokens }
    }

    /// Starts a login attempt.
    ///
    /// Generates a fresh CSRF state, stores it as the session's pending
    /// state (replacing any earlier one, so only the newest login attempt
    /// can complete), and returns the provider authorize URL to redirect
    /// the browser to.
    pub fn begin_login(&self, store: &mut dyn SessionStore) -> String {
        let state = nonce(STATE_NONCE_LEN);
        store.put_pending_state(&state);

        let scope = self.params.scopes.join(" ");
        let url = format!(
            "{}?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.params.authorize_url,
            urlencoding::encode(&self.params.client_id),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.params.redirect_uri),
            urlencoding::encode(&state),
        );

        debug!("issued login redirect with fresh state");
        url
    }

    /// Completes a login attempt from the provider's callback.
    ///
    /// The pending state is consumed before anything else, so a replayed
    /// callback fails even when the first attempt succeeded. On a state
    /// mismatch no token exchange is attempted. On an exchange failure the
    /// session is cleared back to unauthenticated.
    pub async fn handle_callback(
        &self,
        store: &mut dyn SessionStore,
        code: Option<&str>,
        state: Option<&str>,
    ) -> ProviderResult<()> {
        let pending = store.take_pending_state();

        let matches = match (&pending, state) {
            (Some(stored), Some(returned)) => stored == returned,
            _ => false,
        };
        if !matches {
            warn!("callback rejected: state missing or not the pending one");
            return Err(ProviderError::state_mismatch(
                "callback state missing or not the pending one",
            ));
        }

        let code = code.ok_or_else(|| {
            ProviderError::token_exchange("callback did not carry an authorization code")
        })?;

        match self.tokens.exchange_code(code).await {
            Ok(grant) => {
                store.put_tokens(&grant.access_token, grant.refresh_token.as_deref());
                info!("authorization code exchanged, session authenticated");
                Ok(())
            }
            Err(err) => {
                store.clear_tokens();
                Err(err)
            }
        }
    }
}
