//! Token session model and the session store seam.
//!
//! A session is the token pair itself: there is no server-side session
//! table and no session identifier. The [`SessionStore`] trait abstracts
//! the carrier, so the same flow and gateway code runs over request
//! cookies in the server, an in-memory store in tests, or a keyed
//! server-side store should cookie limits ever demand one.

/// The token pair for one client session.
///
/// Expiry is not tracked locally: an expired access token is discovered
/// reactively when a delegated call comes back 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSession {
    /// Bearer token for delegated API requests.
    pub access_token: String,
    /// Token used to obtain a replacement access token.
    pub refresh_token: Option<String>,
}

impl TokenSession {
    /// Creates a new token session.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Carrier-agnostic store for one client session.
///
/// The store is the single source of truth for the token pair and the
/// pending CSRF state; callers never keep their own copy across requests.
pub trait SessionStore: Send {
    /// Stores the token pair, replacing any previous one.
    fn put_tokens(&mut self, access_token: &str, refresh_token: Option<&str>);

    /// Returns the current access token.
    ///
    /// Absence is not an error: it is the logged-out state, and the caller
    /// should start a login redirect.
    fn access_token(&self) -> Option<String>;

    /// Returns the current refresh token.
    fn refresh_token(&self) -> Option<String>;

    /// Removes the token pair, returning the session to logged-out.
    fn clear_tokens(&mut self);

    /// Stores the pending CSRF state for a login attempt, replacing any
    /// previous one. Only the most recently issued state is valid.
    fn put_pending_state(&mut self, state: &str);

    /// Removes and returns the pending CSRF state.
    ///
    /// The state is single-use: a second take returns `None`, which is
    /// what makes a replayed callback fail.
    fn take_pending_state(&mut self) -> Option<String>;
}

/// In-memory session store.
///
/// The test double, and the building block for a server-side keyed
/// session table.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    tokens: Option<TokenSession>,
    pending_state: Option<String>,
}

impl MemorySession {
    /// Creates an empty (logged-out) session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored token session, if any.
    pub fn session(&self) -> Option<&TokenSession> {
        self.tokens.as_ref()
    }
}

impl SessionStore for MemorySession {
    fn put_tokens(&mut self, access_token: &str, refresh_token: Option<&str>) {
        self.tokens = Some(TokenSession::new(
            access_token,
            refresh_token.map(String::from),
        ));
    }

    fn access_token(&self) -> Option<String> {
        self.tokens.as_ref().map(|t| t.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.as_ref().and_then(|t| t.refresh_token.clone())
    }

    fn clear_tokens(&mut self) {
        self.tokens = None;
    }

    fn put_pending_state(&mut self, state: &str) {
        self.pending_state = Some(state.to_string());
    }

    fn take_pending_state(&mut self) -> Option<String> {
        self.pending_state.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_is_logged_out() {
        let store = MemorySession::new();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn put_tokens_and_read_back() {
        let mut store = MemorySession::new();
        store.put_tokens("access-1", Some("refresh-1"));

        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn refresh_token_is_optional() {
        let mut store = MemorySession::new();
        store.put_tokens("access-1", None);

        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn put_tokens_replaces_previous_pair() {
        let mut store = MemorySession::new();
        store.put_tokens("access-1", Some("refresh-1"));
        store.put_tokens("access-2", None);

        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        // The old refresh token does not survive a full replacement.
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn clear_tokens_returns_to_logged_out() {
        let mut store = MemorySession::new();
        store.put_tokens("access-1", Some("refresh-1"));
        store.clear_tokens();

        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn pending_state_is_single_use() {
        let mut store = MemorySession::new();
        store.put_pending_state("state-abc");

        assert_eq!(store.take_pending_state().as_deref(), Some("state-abc"));
        assert!(store.take_pending_state().is_none());
    }

    #[test]
    fn pending_state_is_overwritten_by_new_login() {
        let mut store = MemorySession::new();
        store.put_pending_state("state-old");
        store.put_pending_state("state-new");

        assert_eq!(store.take_pending_state().as_deref(), Some("state-new"));
        assert!(store.take_pending_state().is_none());
    }

    #[test]
    fn pending_state_does_not_touch_tokens() {
        let mut store = MemorySession::new();
        store.put_tokens("access-1", Some("refresh-1"));
        store.put_pending_state("state-abc");
        let _ = store.take_pending_state();

        assert_eq!(store.access_token().as_deref(), Some("access-1"));
    }
}
