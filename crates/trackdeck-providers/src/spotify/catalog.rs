//! Catalog request builders: search and playlist creation.
//!
//! These shape the two delegated operations the service exposes. Response
//! bodies pass through untouched; ranking, pagination and result shaping
//! belong to the consumer.

use trackdeck_core::session::SessionStore;

use crate::api::{ApiRequest, ApiResponse};
use crate::error::{ProviderError, ProviderResult};
use crate::gateway::DelegatedGateway;

/// Item kinds a search can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Track,
    Album,
    Playlist,
}

impl SearchKind {
    /// The wire name of this kind in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Playlist => "playlist",
        }
    }
}

/// A catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: String,
    kinds: Vec<SearchKind>,
    limit: usize,
}

impl SearchQuery {
    /// Default number of items per kind.
    pub const DEFAULT_LIMIT: usize = 12;

    /// Creates a search for the given term.
    ///
    /// The term is trimmed; a term that is empty after trimming is
    /// rejected before any network call.
    pub fn new(query: impl Into<String>) -> ProviderResult<Self> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(ProviderError::bad_request("search query is empty"));
        }
        Ok(Self {
            query,
            kinds: vec![SearchKind::Track, SearchKind::Album, SearchKind::Playlist],
            limit: Self::DEFAULT_LIMIT,
        })
    }

    /// Restricts the search to the given kinds.
    pub fn with_kinds(mut self, kinds: Vec<SearchKind>) -> Self {
        if !kinds.is_empty() {
            self.kinds = kinds;
        }
        self
    }

    /// Sets the number of items per kind.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builds the `GET /search` request.
    pub fn to_request(&self) -> ApiRequest {
        let kinds = self
            .kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(",");

        ApiRequest::get("search")
            .with_query("q", &self.query)
            .with_query("type", kinds)
            .with_query("limit", self.limit.to_string())
    }
}

/// A playlist to create on the user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    name: String,
    description: Option<String>,
    public: bool,
}

impl NewPlaylist {
    /// Creates a playlist description with the given name.
    ///
    /// The name is trimmed; an empty name is rejected before any network
    /// call.
    pub fn new(name: impl Into<String>) -> ProviderResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ProviderError::bad_request("playlist name is empty"));
        }
        Ok(Self {
            name,
            description: None,
            public: false,
        })
    }

    /// Sets the playlist description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether the playlist is public.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Builds the `POST /users/{user_id}/playlists` request.
    pub fn to_request(&self, user_id: &str) -> ApiRequest {
        let mut body = serde_json::Map::new();
        body.insert("name".to_string(), self.name.clone().into());
        if let Some(ref description) = self.description {
            body.insert("description".to_string(), description.clone().into());
        }
        body.insert("public".to_string(), self.public.into());

        ApiRequest::post(format!(
            "users/{}/playlists",
            urlencoding::encode(user_id)
        ))
        .with_body(serde_json::Value::Object(body))
    }
}

/// Builds the `GET /me` request used to resolve the session's user id.
pub fn current_user_request() -> ApiRequest {
    ApiRequest::get("me")
}

impl DelegatedGateway {
    /// Searches the catalog on behalf of the session.
    pub async fn search(
        &self,
        store: &mut dyn SessionStore,
        query: &SearchQuery,
    ) -> ProviderResult<ApiResponse> {
        self.call(store, &query.to_request()).await
    }

    /// Fetches the profile of the user the session is delegated for.
    pub async fn current_user(
        &self,
        store: &mut dyn SessionStore,
    ) -> ProviderResult<ApiResponse> {
        self.call(store, &current_user_request()).await
    }

    /// Creates a playlist on the given user's account.
    pub async fn create_playlist(
        &self,
        store: &mut dyn SessionStore,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> ProviderResult<ApiResponse> {
        self.call(store, &playlist.to_request(user_id)).await
    }
}
