//! Conversation state: transcripts, their store, and the orchestrator that
//! drives the search-then-chat protocol.

pub mod orchestrator;
pub mod store;
pub mod transcript;

pub use orchestrator::{ConversationError, ConversationOrchestrator, TurnSampling};
pub use store::{ConversationStore, MemoryConversationStore};
pub use transcript::Transcript;
