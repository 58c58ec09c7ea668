//! Per-user conversation transcript
//!
//! A transcript always starts with the system instruction, followed by
//! alternating user/assistant messages in turn order. The fields are private
//! so that invariant only changes through whole turns.

use crate::llm::{Message, MessageRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Transcript after the first answered question
    pub fn seeded(
        system: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            messages: vec![
                Message::system(system),
                Message::user(question),
                Message::assistant(answer),
            ],
        }
    }

    /// All messages, system instruction first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, including the system instruction
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of answered questions
    pub fn turns(&self) -> usize {
        self.messages.len().saturating_sub(1) / 2
    }

    /// Message list for the next completion call: history plus the new
    /// question
    pub fn request_for(&self, question: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend_from_slice(&self.messages);
        messages.push(Message::user(question));
        messages
    }

    /// Append an answered turn
    pub fn push_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(Message::user(question));
        self.messages.push(Message::assistant(answer));
    }

    /// Last assistant answer
    pub fn last_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }
}
