//! Two-phase conversation protocol
//!
//! Per user identifier the orchestrator is either Uninitialized (no stored
//! transcript) or Active.
//!
//! - `start_conversation`: search, answer with the documents as context,
//!   then store `[system, question, answer]`. Any failure leaves the user
//!   Uninitialized.
//! - `continue_conversation`: requires Active. Sends the stored transcript
//!   plus the new question to the generator; on success the transcript is
//!   replaced with the extended one. A failed call leaves it untouched.

use std::sync::Arc;

use super::store::ConversationStore;
use super::transcript::Transcript;
use crate::config::{CompletionConfig, PromptConfig};
use crate::llm::{CompletionProvider, LLMError, Message, SamplingParams};
use crate::search::{format_context, SearchError, SearchProvider};

/// Errors surfaced to the caller of the conversation protocol
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversationError {
    #[error("Aucune question fournie.")]
    EmptyQuestion,

    #[error("Aucun historique trouvé pour l'utilisateur {user_id}.")]
    NoHistory { user_id: String },

    #[error("Erreur Search : {0}")]
    Search(#[from] SearchError),

    #[error("Erreur OpenAI : {0}")]
    Generation(#[from] LLMError),
}

impl ConversationError {
    /// True when the request itself is invalid for the current state, as
    /// opposed to an upstream failure
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, Self::EmptyQuestion | Self::NoHistory { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConversationError>;

/// Sampling presets for both phases
#[derive(Debug, Clone, Copy)]
pub struct TurnSampling {
    pub initial: SamplingParams,
    pub follow_up: SamplingParams,
}

impl Default for TurnSampling {
    fn default() -> Self {
        Self {
            initial: SamplingParams::initial(),
            follow_up: SamplingParams::follow_up(),
        }
    }
}

impl From<&CompletionConfig> for TurnSampling {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            initial: config.initial,
            follow_up: config.follow_up,
        }
    }
}

pub struct ConversationOrchestrator {
    search: Arc<dyn SearchProvider>,
    generator: Arc<dyn CompletionProvider>,
    store: Arc<dyn ConversationStore>,
    prompts: PromptConfig,
    sampling: TurnSampling,
}

impl ConversationOrchestrator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        generator: Arc<dyn CompletionProvider>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            search,
            generator,
            store,
            prompts: PromptConfig::default(),
            sampling: TurnSampling::default(),
        }
    }

    /// Override the prompt texts
    pub fn with_prompts(mut self, prompts: PromptConfig) -> Self {
        self.prompts = prompts;
        self
    }

    /// Override the sampling presets
    pub fn with_sampling(mut self, sampling: TurnSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// First question: search, answer with context, seed the transcript.
    ///
    /// Starting again for an Active user replaces the previous conversation.
    pub async fn start_conversation(&self, user_id: &str, question: &str) -> Result<String> {
        let question = non_empty(question)?;

        tracing::info!(user_id, search = self.search.name(), "Starting conversation");

        let snippets = self.search.search(question).await.map_err(|e| {
            tracing::warn!(user_id, error = %e, "Search failed");
            e
        })?;
        let context = format_context(&snippets);

        let messages = vec![
            Message::system(self.prompts.rag_system.as_str()),
            Message::user(format!(
                "Voici le contexte :\n{}\n\nQuestion : {}",
                context, question
            )),
        ];

        let answer = self
            .generator
            .generate(&messages, &self.sampling.initial)
            .await
            .map_err(|e| {
                tracing::warn!(user_id, error = %e, "Initial answer generation failed");
                e
            })?;

        self.store.put(
            user_id,
            Transcript::seeded(self.prompts.follow_up_system.as_str(), question, answer.as_str()),
        );

        tracing::info!(user_id, documents = snippets.len(), "Conversation started");
        Ok(answer)
    }

    /// Follow-up question: answer from the stored transcript, no search.
    pub async fn continue_conversation(&self, user_id: &str, question: &str) -> Result<String> {
        let question = non_empty(question)?;

        let mut transcript =
            self.store
                .get(user_id)
                .ok_or_else(|| ConversationError::NoHistory {
                    user_id: user_id.to_string(),
                })?;

        tracing::info!(
            user_id,
            turns = transcript.turns(),
            "Continuing conversation"
        );

        let messages = transcript.request_for(question);
        let answer = self
            .generator
            .generate(&messages, &self.sampling.follow_up)
            .await
            .map_err(|e| {
                tracing::warn!(user_id, error = %e, "Follow-up generation failed");
                e
            })?;

        transcript.push_turn(question, answer.as_str());
        self.store.put(user_id, transcript);

        Ok(answer)
    }

    /// Whether `user_id` is in the Active state
    pub fn has_conversation(&self, user_id: &str) -> bool {
        self.store.contains(user_id)
    }

    /// Stored transcript for `user_id`
    pub fn transcript(&self, user_id: &str) -> Option<Transcript> {
        self.store.get(user_id)
    }

    /// Number of active conversations
    pub fn active_conversations(&self) -> usize {
        self.store.len()
    }
}

fn non_empty(question: &str) -> Result<&str> {
    if question.trim().is_empty() {
        Err(ConversationError::EmptyQuestion)
    } else {
        Ok(question)
    }
}
