//! Error types and handling
//!
//! This module provides the error type shared by the ragchat engine and its
//! front ends. All errors implement the `RagErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry secret values (API keys, the shared password).
//! Callers that echo upstream response bodies are expected to scrub them
//! before wrapping them in an `EngineError`.

use thiserror::Error;

/// Trait for ragchat error extensions
///
/// Provides context for errors: a hint that is safe to show to end users
/// and whether retrying the operation can succeed.
pub trait RagErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint never contains secrets, file paths or upstream payloads.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors may succeed on a later attempt. Non-recoverable
    /// errors require a configuration change or operator intervention.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: invalid or missing configuration
/// - **Secrets**: API keys or password unavailable
/// - **Upstream**: search or completion service failures
/// - **Server**: HTTP listener failures
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RagErrorExt};
///
/// let error = EngineError::SecretNotFound("azure_openai_key".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(!error.is_recoverable());
///
/// let transient = EngineError::Network("connection reset".to_string());
/// assert!(transient.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Secret errors
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Keyring error: {0}")]
    KeyringError(String),

    // Upstream service errors
    #[error("Search service error: {0}")]
    Search(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::SecretNotFound(_) => {
                "Set the missing key in the environment or the system keychain"
            }
            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",
            Self::Search(_) => "Document search failed. Check the search endpoint and index",
            Self::Completion(_) => "Answer generation failed. Check the completion endpoint",
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Server(_) => "The HTTP server could not start. Check the bind address",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) | Self::SecretNotFound(_) | Self::Server(_) => false,
            _ => true,
        }
    }
}
