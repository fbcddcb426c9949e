//! The delegated API gateway: bearer auth plus single-retry-on-expiry.
//!
//! Every authenticated action routes through [`DelegatedGateway::call`].
//! The gateway reads the access token from the session store, and on a 401
//! it refreshes at most once, writes the new token(s) back, and retries the
//! original request exactly once. Anything else is surfaced as-is.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use trackdeck_core::session::SessionStore;

use crate::api::{ApiRequest, ApiResponse, CatalogApi, TokenEndpoint};
use crate::error::{ProviderError, ProviderResult};

/// Wraps outbound catalog calls with the current session's access token.
pub struct DelegatedGateway {
    api: Arc<dyn CatalogApi>,
    tokens: Arc<dyn TokenEndpoint>,
    /// Serializes refresh attempts so two requests that both observe a 401
    /// refresh back-to-back instead of concurrently.
    refresh_guard: Mutex<()>,
}

impl DelegatedGateway {
    /// Creates a gateway over the given catalog transport and token endpoint.
    pub fn new(api: Arc<dyn CatalogApi>, tokens: Arc<dyn TokenEndpoint>) -> Self {
        Self {
            api,
            tokens,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Issues one delegated request on behalf of the session.
    ///
    /// Behavior:
    /// - no access token in the store: fails with `Unauthenticated`, no
    ///   network call is made;
    /// - a 401 with a refresh token present: one refresh, one retry with
    ///   the new token; if either fails, the original 401 failure is
    ///   surfaced;
    /// - any other failure status: surfaced directly, no refresh attempt.
    pub async fn call(
        &self,
        store: &mut dyn SessionStore,
        request: &ApiRequest,
    ) -> ProviderResult<ApiResponse> {
        let access_token = store
            .access_token()
            .ok_or_else(|| ProviderError::unauthenticated("no access token in session"))?;

        let response = self.api.execute(request, &access_token).await?;
        if !response.is_unauthorized() {
            return Self::finish(request, response);
        }

        let Some(refresh_token) = store.refresh_token() else {
            debug!("401 with no refresh token, surfacing");
            return Err(Self::token_rejected(request));
        };

        let grant = {
            let _guard = self.refresh_guard.lock().await;
            match self.tokens.refresh(&refresh_token).await {
                Ok(grant) => grant,
                Err(err) => {
                    warn!("token refresh failed: {err}");
                    return Err(Self::token_rejected(request));
                }
            }
        };

        // The provider may rotate the refresh token; keep the old one when
        // it does not.
        let new_refresh = grant.refresh_token.as_deref().unwrap_or(&refresh_token);
        store.put_tokens(&grant.access_token, Some(new_refresh));
        debug!("access token refreshed, retrying {} {}", request.method, request.endpoint);

        match self.api.execute(request, &grant.access_token).await {
            Ok(retried) if retried.is_success() => Ok(retried),
            Ok(_) | Err(_) => Err(Self::token_rejected(request)),
        }
    }

    /// Maps a completed exchange to the caller-facing result.
    fn finish(request: &ApiRequest, response: ApiResponse) -> ProviderResult<ApiResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ProviderError::delegated(format!(
                "catalog API returned status {} for {} {}",
                response.status, request.method, request.endpoint
            ))
            .with_status(response.status))
        }
    }

    /// The original 401-derived failure, surfaced when the refresh path
    /// cannot recover.
    fn token_rejected(request: &ApiRequest) -> ProviderError {
        ProviderError::delegated(format!(
            "catalog API rejected the access token for {} {}",
            request.method, request.endpoint
        ))
        .with_status(401)
    }
}
