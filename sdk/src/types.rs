//! JSON wire types of the ragchat HTTP API
//!
//! Shared between the server and any Rust client. Answers and errors travel
//! in distinct shapes so a caller never has to sniff message text.

use serde::{Deserialize, Serialize};

/// Body of `POST /ask-rag` and `POST /chat-continue`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,

    /// Opaque conversation key; the server substitutes its default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AskRequest {
    /// Create a request for the given question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_id: None,
        }
    }

    /// Attach a user identifier
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Successful answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result of a successful `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
}

/// Result of a rejected `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRejected {
    pub detail: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub conversations: usize,
}
