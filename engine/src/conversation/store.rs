//! Conversation store
//!
//! Maps an opaque user identifier to that user's transcript. The
//! orchestrator holds the store as `Arc<dyn ConversationStore>`, so a
//! persistent backend can replace the in-memory one.
//!
//! `MemoryConversationStore` bounds memory with two limits, each disabled
//! when set to zero:
//! - `max_entries`: inserting a new user beyond the limit evicts the least
//!   recently active conversation
//! - `idle_ttl`: conversations untouched for longer read as absent and are
//!   purged on the next write

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

use super::transcript::Transcript;
use crate::config::ConversationsConfig;

/// Storage seam for transcripts
///
/// `put` fully replaces any previous transcript for the user.
pub trait ConversationStore: Send + Sync {
    /// Transcript for `user_id`, if the conversation is active
    fn get(&self, user_id: &str) -> Option<Transcript>;

    /// Store or replace the transcript for `user_id`
    fn put(&self, user_id: &str, transcript: Transcript);

    /// Number of active conversations
    fn len(&self) -> usize;

    /// Whether `user_id` has an active conversation
    fn contains(&self, user_id: &str) -> bool {
        self.get(user_id).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    transcript: Transcript,
    last_active: Instant,
}

/// In-memory store with LRU and idle-time eviction
#[derive(Debug)]
pub struct MemoryConversationStore {
    entries: RwLock<HashMap<String, Entry>>,
    max_entries: usize,
    idle_ttl: Option<Duration>,
}

impl MemoryConversationStore {
    /// Store without any limit
    pub fn unbounded() -> Self {
        Self::with_limits(0, None)
    }

    /// Store with explicit limits; `max_entries == 0` means unlimited
    pub fn with_limits(max_entries: usize, idle_ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            idle_ttl: idle_ttl.filter(|ttl| !ttl.is_zero()),
        }
    }

    pub fn from_config(config: &ConversationsConfig) -> Self {
        Self::with_limits(
            config.max_entries,
            Some(Duration::from_secs(config.idle_ttl_secs)),
        )
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        self.idle_ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.last_active) > ttl)
    }

    fn evict_least_recent(entries: &mut HashMap<String, Entry>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_active)
            .map(|(user_id, _)| user_id.clone());

        if let Some(user_id) = oldest {
            tracing::debug!(user_id = %user_id, "Evicting least recently active conversation");
            entries.remove(&user_id);
        }
    }
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::from_config(&ConversationsConfig::default())
    }
}

impl ConversationStore for MemoryConversationStore {
    fn get(&self, user_id: &str) -> Option<Transcript> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(user_id)?;

        if self.is_expired(entry, Instant::now()) {
            None
        } else {
            Some(entry.transcript.clone())
        }
    }

    fn put(&self, user_id: &str, transcript: Transcript) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        if self.idle_ttl.is_some() {
            let before = entries.len();
            entries.retain(|_, entry| !self.is_expired(entry, now));
            let purged = before - entries.len();
            if purged > 0 {
                tracing::debug!(purged, "Purged idle conversations");
            }
        }

        if self.max_entries > 0 && !entries.contains_key(user_id) {
            while entries.len() >= self.max_entries {
                Self::evict_least_recent(&mut entries);
            }
        }

        entries.insert(
            user_id.to_string(),
            Entry {
                transcript,
                last_active: now,
            },
        );
    }

    fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count()
    }
}
