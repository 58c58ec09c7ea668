use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;

use super::error::ApiError;
use super::session::{cookie_value, SessionStore};
use crate::config::ServerConfig;
use crate::conversation::ConversationOrchestrator;
use crate::secrets::SecretString;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub sessions: Arc<SessionStore>,
    pub password: SecretString,
    pub settings: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<ConversationOrchestrator>,
        password: SecretString,
        settings: ServerConfig,
    ) -> Self {
        Self {
            orchestrator,
            sessions: Arc::new(SessionStore::with_ttl(Duration::from_secs(
                settings.session_ttl_secs,
            ))),
            password,
            settings: Arc::new(settings),
        }
    }

    /// Session token carried by the request, if it is still valid
    pub fn session(&self, headers: &HeaderMap) -> Option<String> {
        cookie_value(headers, &self.settings.session_cookie)
            .filter(|token| self.sessions.is_valid(token))
    }

    pub fn require_session(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        self.session(headers)
            .map(|_| ())
            .ok_or(ApiError::Unauthorized)
    }

    /// Conversation key for a request, defaulting when absent or blank
    pub fn user_id<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&self.settings.default_user_id)
    }
}
