//! ragchat engine library
//!
//! Retrieval-augmented chat over an Azure AI Search index and an Azure
//! OpenAI chat deployment. Used by the `ragchat` binary and the
//! integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Chat completion provider abstraction
pub mod llm;

/// Document search gateway
pub mod search;

/// Conversation transcripts, store and orchestration
pub mod conversation;

/// HTTP front end
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
