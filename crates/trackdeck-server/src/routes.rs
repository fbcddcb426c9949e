//! HTTP routes for the session/authorization surface.
//!
//! The UI layer in front of this service only ever sees four things:
//! a login redirect, the provider callback, and JSON passthrough for the
//! two delegated actions. Cookies carry the session; every handler parses
//! them at the start of the request and writes back at most once at the
//! end.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use trackdeck_core::session::SessionStore;
use trackdeck_providers::api::{ApiResponse, CatalogApi, TokenEndpoint};
use trackdeck_providers::error::{ProviderError, ProviderErrorCode, ProviderResult};
use trackdeck_providers::flow::{AuthFlow, AuthorizeParams};
use trackdeck_providers::gateway::DelegatedGateway;
use trackdeck_providers::spotify::{
    CatalogClient, NewPlaylist, SearchKind, SearchQuery, SpotifyConfig, TokenClient,
};

use crate::config::ServerConfig;
use crate::cookies::CookieSession;
use crate::error::{ServerError, ServerResult};

/// Shared state for the HTTP handlers.
pub struct AppState {
    flow: AuthFlow,
    gateway: DelegatedGateway,
    secure_cookies: bool,
}

impl AppState {
    /// Wires the surface against the live Spotify endpoints.
    pub fn new(provider: &SpotifyConfig, server: &ServerConfig) -> Self {
        let tokens: Arc<dyn TokenEndpoint> = Arc::new(TokenClient::new(provider));
        let api: Arc<dyn CatalogApi> = Arc::new(CatalogClient::new(provider));
        Self::with_seams(provider.authorize_params(), tokens, api, server.secure_cookies)
    }

    /// Wires the surface over explicit seam implementations.
    pub fn with_seams(
        params: AuthorizeParams,
        tokens: Arc<dyn TokenEndpoint>,
        api: Arc<dyn CatalogApi>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            flow: AuthFlow::new(params, tokens.clone()),
            gateway: DelegatedGateway::new(api, tokens),
            secure_cookies,
        }
    }
}

/// Builds the router for the session/authorization surface.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/search", get(search))
        .route("/playlist", post(create_playlist))
        .route("/health", get(health))
        .with_state(state)
}

/// Starts serving on the configured address and blocks until shutdown.
pub async fn serve(server: ServerConfig, provider: &SpotifyConfig) -> ServerResult<()> {
    let state = Arc::new(AppState::new(provider, &server));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(server.bind_addr).await?;
    info!("listening on {}", server.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn session_from(headers: &HeaderMap, state: &AppState) -> CookieSession {
    let header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    CookieSession::from_header(header, state.secure_cookies)
}

/// Attaches the session's `Set-Cookie` headers to a response.
fn with_cookies(mut response: Response, session: &CookieSession) -> Response {
    for value in session.set_cookie_values() {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => warn!("dropping unencodable cookie value"),
        }
    }
    response
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn login(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let mut session = session_from(&headers, &state);
    let url = state.flow.begin_login(&mut session);
    with_cookies(Redirect::to(&url).into_response(), &session)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let mut session = session_from(&headers, &state);

    if let Some(ref error) = params.error {
        // The user denied access at the provider. The pending state is
        // discarded regardless of outcome.
        let _ = session.take_pending_state();
        warn!("authorization denied at the provider: {}", error);
        return with_cookies(
            Redirect::to("/?error=access_denied").into_response(),
            &session,
        );
    }

    match state
        .flow
        .handle_callback(&mut session, params.code.as_deref(), params.state.as_deref())
        .await
    {
        Ok(()) => with_cookies(Redirect::to("/").into_response(), &session),
        Err(err) => {
            let reason = if err.code() == ProviderErrorCode::StateMismatch {
                "state_mismatch"
            } else {
                "invalid_token"
            };
            with_cookies(
                Redirect::to(&format!("/?error={}", reason)).into_response(),
                &session,
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    #[serde(rename = "type")]
    kinds: Option<String>,
    limit: Option<usize>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    let mut session = session_from(&headers, &state);

    let query = match build_search_query(&params) {
        Ok(query) => query,
        Err(err) => return with_cookies(ServerError::from(err).into_response(), &session),
    };

    match state.gateway.search(&mut session, &query).await {
        Ok(response) => with_cookies(passthrough(response), &session),
        Err(err) => with_cookies(ServerError::from(err).into_response(), &session),
    }
}

fn build_search_query(params: &SearchParams) -> ProviderResult<SearchQuery> {
    let mut query = SearchQuery::new(params.q.clone().unwrap_or_default())?;
    if let Some(ref kinds) = params.kinds {
        query = query.with_kinds(parse_kinds(kinds)?);
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }
    Ok(query)
}

fn parse_kinds(csv: &str) -> ProviderResult<Vec<SearchKind>> {
    csv.split(',')
        .map(|kind| match kind.trim() {
            "track" => Ok(SearchKind::Track),
            "album" => Ok(SearchKind::Album),
            "playlist" => Ok(SearchKind::Playlist),
            other => Err(ProviderError::bad_request(format!(
                "unknown search type: {}",
                other
            ))),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CreatePlaylistBody {
    user_id: Option<String>,
    name: String,
    description: Option<String>,
    #[serde(default)]
    public: bool,
}

async fn create_playlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePlaylistBody>,
) -> Response {
    let mut session = session_from(&headers, &state);

    match create_playlist_inner(&state, &mut session, body).await {
        Ok(response) => with_cookies(passthrough(response), &session),
        Err(err) => with_cookies(ServerError::from(err).into_response(), &session),
    }
}

async fn create_playlist_inner(
    state: &AppState,
    session: &mut CookieSession,
    body: CreatePlaylistBody,
) -> ProviderResult<ApiResponse> {
    let mut playlist = NewPlaylist::new(body.name)?;
    if let Some(description) = body.description {
        playlist = playlist.with_description(description);
    }
    playlist = playlist.with_public(body.public);

    let user_id = match body.user_id {
        Some(id) => id,
        None => {
            let me = state.gateway.current_user(session).await?;
            me.body
                .get("id")
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| ProviderError::invalid_response("user profile without an id"))?
        }
    };

    state
        .gateway
        .create_playlist(session, &user_id, &playlist)
        .await
}

/// Relays a successful delegated response, status and body untouched.
fn passthrough(response: ApiResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    (status, Json(response.body)).into_response()
}
