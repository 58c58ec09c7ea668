//! Answer generation layer
//!
//! This module defines the message model exchanged with the completion
//! service and the `CompletionProvider` trait that the conversation
//! orchestrator calls. The concrete provider lives in [`azure_openai`].

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod azure_openai;

/// Result type for completion operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while generating an answer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LLMError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LLMError> for EngineError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::NetworkError(msg) => EngineError::Network(msg),
            other => EngineError::Completion(other.to_string()),
        }
    }
}

/// Message in a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction
    System,

    /// User message
    User,

    /// Assistant message
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Fixed sampling parameters sent with every completion request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_n")]
    pub n: u32,
}

fn default_top_p() -> f64 {
    0.95
}

fn default_n() -> u32 {
    1
}

impl SamplingParams {
    /// Preset for the search-grounded first answer
    pub fn initial() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
            top_p: default_top_p(),
            n: default_n(),
        }
    }

    /// Preset for follow-up turns
    pub fn follow_up() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 2000,
            top_p: default_top_p(),
            n: default_n(),
        }
    }

    /// Check value ranges; `section` names the config table in errors
    pub fn validate(&self, section: &str) -> std::result::Result<(), EngineError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(EngineError::Config(format!(
                "{}.temperature must be between 0.0 and 2.0",
                section
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(EngineError::Config(format!(
                "{}.top_p must be between 0.0 and 1.0",
                section
            )));
        }
        if self.max_tokens == 0 {
            return Err(EngineError::Config(format!(
                "{}.max_tokens must be at least 1",
                section
            )));
        }
        if self.n == 0 {
            return Err(EngineError::Config(format!(
                "{}.n must be at least 1",
                section
            )));
        }
        Ok(())
    }
}

/// Completion provider trait
///
/// Implementations submit the full message list and return the text of the
/// first choice. Failures stay on the error channel; they are never folded
/// into answer text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider
    fn name(&self) -> &str;

    /// Generate an answer for the given messages
    ///
    /// # Arguments
    /// * `messages` - System instruction, context and prior turns, in order
    /// * `params` - Sampling parameters for this call
    async fn generate(&self, messages: &[Message], params: &SamplingParams) -> Result<String>;
}
