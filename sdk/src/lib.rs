//! Ragchat SDK
//!
//! Shared library providing the error type and HTTP wire types used by the
//! ragchat engine and its clients.

/// Error types and handling
pub mod errors;

/// HTTP API request/response types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, RagErrorExt};
pub use types::{
    AnswerResponse, AskRequest, ErrorResponse, HealthResponse, LoginRejected, LoginResponse,
};
