//! Cookie sessions for the login gate.
//!
//! A successful login mints a random token, stores it in memory and hands it
//! to the browser in an `HttpOnly` cookie. Tokens live until logout or until
//! they are older than the session TTL; expired tokens are purged on the next
//! login.

use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashMap<String, Instant>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Store whose tokens never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose tokens expire `ttl` after login; zero means never
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            ttl: Some(ttl).filter(|ttl| !ttl.is_zero()),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn is_expired(&self, issued: Instant, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(issued) > ttl)
    }

    /// Mint and register a new session token
    pub fn create(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());

        if self.ttl.is_some() {
            let before = tokens.len();
            tokens.retain(|_, issued| !self.is_expired(*issued, now));
            let purged = before - tokens.len();
            if purged > 0 {
                tracing::debug!(purged, "Purged expired sessions");
            }
        }

        tokens.insert(token.clone(), now);
        token
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .is_some_and(|issued| !self.is_expired(*issued, Instant::now()))
    }

    /// Forget a token; returns whether it existed
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
            .is_some()
    }

    /// Number of stored tokens, expired ones included until purged
    pub fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value of the cookie `name` from the request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that installs a session, with `Max-Age` when the
/// session expires
pub fn session_cookie(name: &str, token: &str, max_age: Option<Duration>) -> String {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, token);
    match max_age {
        Some(age) => format!("{}; Max-Age={}", cookie, age.as_secs()),
        None => cookie,
    }
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_create_and_revoke() {
        let sessions = SessionStore::new();
        let token = sessions.create();

        assert!(sessions.is_valid(&token));
        assert!(sessions.revoke(&token));
        assert!(!sessions.is_valid(&token));
        assert!(!sessions.revoke(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let sessions = SessionStore::new();
        assert_ne!(sessions.create(), sessions.create());
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_rag=abc123; other=1"),
        );

        assert_eq!(cookie_value(&headers, "session_rag"), Some("abc123".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("session_rag=xyz"));

        assert_eq!(cookie_value(&headers, "session_rag"), Some("xyz".to_string()));
    }

    #[test]
    fn test_cookie_strings() {
        assert_eq!(
            session_cookie("session_rag", "t", None),
            "session_rag=t; Path=/; HttpOnly; SameSite=Lax"
        );
        assert_eq!(
            session_cookie("session_rag", "t", Some(Duration::from_secs(1_209_600))),
            "session_rag=t; Path=/; HttpOnly; SameSite=Lax; Max-Age=1209600"
        );
        assert!(clear_cookie("session_rag").contains("Max-Age=0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_expire_after_ttl() {
        let sessions = SessionStore::with_ttl(Duration::from_secs(60));
        let token = sessions.create();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(sessions.is_valid(&token));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!sessions.is_valid(&token));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_tokens_purged_on_login() {
        let sessions = SessionStore::with_ttl(Duration::from_secs(60));
        sessions.create();
        sessions.create();
        assert_eq!(sessions.len(), 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        let fresh = sessions.create();

        assert_eq!(sessions.len(), 1);
        assert!(sessions.is_valid(&fresh));
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let sessions = SessionStore::with_ttl(Duration::ZERO);
        assert_eq!(sessions.ttl(), None);
        let token = sessions.create();
        assert!(sessions.is_valid(&token));
    }
}
