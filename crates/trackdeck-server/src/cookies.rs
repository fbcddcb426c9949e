//! Cookie session carrier.
//!
//! The session is round-tripped entirely in client-held cookies: the two
//! token cookies plus the pending CSRF state. There is no session id and
//! no server-side table; the tokens themselves are the session. The
//! carrier tracks which cookies a request mutated and emits `Set-Cookie`
//! values only for those, so an untouched session writes nothing back.

use trackdeck_core::session::SessionStore;

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "td_access_token";
/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "td_refresh_token";
/// Cookie holding the pending CSRF state between login and callback.
pub const STATE_COOKIE: &str = "td_auth_state";

/// Parses a `Cookie` request header into name/value pairs.
///
/// Values are percent-decoded; malformed pairs are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = urlencoding::decode(value.trim()).ok()?.into_owned();
            Some((name.to_string(), value))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CookieValues {
    access_token: Option<String>,
    refresh_token: Option<String>,
    pending_state: Option<String>,
}

/// A [`SessionStore`] over one request's cookies.
///
/// Built from the inbound `Cookie` header at the start of a request;
/// [`CookieSession::set_cookie_values`] yields the outbound `Set-Cookie`
/// headers at the end.
#[derive(Debug)]
pub struct CookieSession {
    current: CookieValues,
    initial: CookieValues,
    secure: bool,
}

impl CookieSession {
    /// Parses the session out of an inbound `Cookie` header.
    ///
    /// A missing header or missing cookies is the valid logged-out state.
    pub fn from_header(header: Option<&str>, secure: bool) -> Self {
        let mut values = CookieValues::default();
        if let Some(header) = header {
            for (name, value) in parse_cookie_header(header) {
                match name.as_str() {
                    ACCESS_COOKIE => values.access_token = Some(value),
                    REFRESH_COOKIE => values.refresh_token = Some(value),
                    STATE_COOKIE => values.pending_state = Some(value),
                    _ => {}
                }
            }
        }
        Self {
            current: values.clone(),
            initial: values,
            secure,
        }
    }

    /// Returns the `Set-Cookie` values for the cookies this request
    /// changed. Unchanged cookies are not re-written.
    pub fn set_cookie_values(&self) -> Vec<String> {
        let pairs = [
            (
                ACCESS_COOKIE,
                &self.initial.access_token,
                &self.current.access_token,
            ),
            (
                REFRESH_COOKIE,
                &self.initial.refresh_token,
                &self.current.refresh_token,
            ),
            (
                STATE_COOKIE,
                &self.initial.pending_state,
                &self.current.pending_state,
            ),
        ];

        pairs
            .into_iter()
            .filter(|(_, initial, current)| initial != current)
            .map(|(name, _, current)| match current {
                Some(value) => self.set_cookie(name, value),
                None => self.removal_cookie(name),
            })
            .collect()
    }

    fn set_cookie(&self, name: &str, value: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            name,
            urlencoding::encode(value)
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn removal_cookie(&self, name: &str) -> String {
        let mut cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl SessionStore for CookieSession {
    fn put_tokens(&mut self, access_token: &str, refresh_token: Option<&str>) {
        self.current.access_token = Some(access_token.to_string());
        self.current.refresh_token = refresh_token.map(String::from);
    }

    fn access_token(&self) -> Option<String> {
        self.current.access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.current.refresh_token.clone()
    }

    fn clear_tokens(&mut self) {
        self.current.access_token = None;
        self.current.refresh_token = None;
    }

    fn put_pending_state(&mut self, state: &str) {
        self.current.pending_state = Some(state.to_string());
    }

    fn take_pending_state(&mut self) -> Option<String> {
        self.current.pending_state.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_pairs() {
        let pairs = parse_cookie_header("a=1; b=2;c=3");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn parse_header_skips_malformed_pairs() {
        let pairs = parse_cookie_header("a=1; justaname; =novalue; b=2");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn parse_header_decodes_values() {
        let pairs = parse_cookie_header("td_access_token=BQ%2Fabc%3D%3D");
        assert_eq!(pairs[0].1, "BQ/abc==");
    }

    #[test]
    fn missing_header_is_logged_out() {
        let session = CookieSession::from_header(None, false);
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(session.set_cookie_values().is_empty());
    }

    #[test]
    fn tokens_are_read_from_the_header() {
        let session = CookieSession::from_header(
            Some("td_access_token=acc; td_refresh_token=ref; other=x"),
            false,
        );
        assert_eq!(session.access_token().as_deref(), Some("acc"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref"));
    }

    #[test]
    fn untouched_session_writes_nothing() {
        let session =
            CookieSession::from_header(Some("td_access_token=acc; td_refresh_token=ref"), false);
        assert!(session.set_cookie_values().is_empty());
    }

    #[test]
    fn put_tokens_writes_both_token_cookies() {
        let mut session = CookieSession::from_header(None, false);
        session.put_tokens("acc", Some("ref"));

        let cookies = session.set_cookie_values();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("td_access_token=acc; "));
        assert!(cookies[1].starts_with("td_refresh_token=ref; "));
        assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
        assert!(cookies.iter().all(|c| c.contains("SameSite=Lax")));
    }

    #[test]
    fn refresh_rewrites_only_the_access_cookie() {
        let mut session =
            CookieSession::from_header(Some("td_access_token=old; td_refresh_token=ref"), false);
        // What the gateway does after a refresh without rotation.
        session.put_tokens("new", Some("ref"));

        let cookies = session.set_cookie_values();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("td_access_token=new; "));
    }

    #[test]
    fn clear_tokens_emits_removals() {
        let mut session =
            CookieSession::from_header(Some("td_access_token=acc; td_refresh_token=ref"), false);
        session.clear_tokens();

        let cookies = session.set_cookie_values();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn taking_the_state_removes_its_cookie() {
        let mut session = CookieSession::from_header(Some("td_auth_state=s1"), false);
        assert_eq!(session.take_pending_state().as_deref(), Some("s1"));
        assert!(session.take_pending_state().is_none());

        let cookies = session.set_cookie_values();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("td_auth_state=; "));
    }

    #[test]
    fn secure_flag_is_applied() {
        let mut session = CookieSession::from_header(None, true);
        session.put_pending_state("s1");

        let cookies = session.set_cookie_values();
        assert!(cookies[0].ends_with("; Secure"));
    }

    #[test]
    fn token_values_are_percent_encoded() {
        let mut session = CookieSession::from_header(None, false);
        session.put_tokens("BQ/abc==", None);

        let cookies = session.set_cookie_values();
        assert!(cookies[0].starts_with("td_access_token=BQ%2Fabc%3D%3D; "));
    }
}
