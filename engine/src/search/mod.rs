//! Document search gateway
//!
//! Sends the raw question to an external search service and turns the
//! ranked documents into bounded-length snippets ready to be injected as
//! context. The concrete client lives in [`azure`].
//!
//! Snippet rules:
//! - at most `top` snippets, in service rank order
//! - each snippet is `"{title} : {content-or-text}"`
//! - longer than `max_chars` characters -> cut and suffixed with `...`
//! - no documents -> one placeholder snippet, which is not an error

use async_trait::async_trait;
use sdk::errors::EngineError;

pub mod azure;

/// Marker appended to truncated snippets
pub const ELLIPSIS: &str = "...";

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while querying the search service
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Search service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<SearchError> for EngineError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Network(msg) => EngineError::Network(msg),
            other => EngineError::Search(other.to_string()),
        }
    }
}

/// Search provider trait
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the name of the provider
    fn name(&self) -> &str;

    /// Search for documents matching `question`
    ///
    /// Returns between 1 and `top` snippets; an empty result set yields the
    /// placeholder snippet.
    async fn search(&self, question: &str) -> Result<Vec<String>>;
}

/// Snippet formatting limits
#[derive(Debug, Clone)]
pub struct SnippetPolicy {
    /// Maximum number of snippets kept
    pub top: usize,

    /// Character budget per snippet
    pub max_chars: usize,

    /// Snippet used when nothing matched
    pub placeholder: String,
}

impl SnippetPolicy {
    /// Build snippets from `(title, body)` pairs in rank order
    pub fn build<I, T, B>(&self, documents: I) -> Vec<String>
    where
        I: IntoIterator<Item = (T, B)>,
        T: AsRef<str>,
        B: AsRef<str>,
    {
        let snippets: Vec<String> = documents
            .into_iter()
            .take(self.top)
            .map(|(title, body)| {
                truncate_chars(&format_snippet(title.as_ref(), body.as_ref()), self.max_chars)
            })
            .collect();

        if snippets.is_empty() {
            vec![self.placeholder.clone()]
        } else {
            snippets
        }
    }
}

/// `"{title} : {body}"`
pub fn format_snippet(title: &str, body: &str) -> String {
    format!("{} : {}", title, body)
}

/// Cut `text` to `max_chars` characters, appending [`ELLIPSIS`] when cut.
///
/// Counts Unicode scalar values, never splits a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Join snippets into the context block sent to the completion service
pub fn format_context(snippets: &[String]) -> String {
    snippets.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(top: usize, max_chars: usize) -> SnippetPolicy {
        SnippetPolicy {
            top,
            max_chars,
            placeholder: "Aucun document pertinent trouvé.".to_string(),
        }
    }

    #[test]
    fn test_format_snippet() {
        assert_eq!(format_snippet("CGI art. 150", "Plus-values"), "CGI art. 150 : Plus-values");
        assert_eq!(format_snippet("", "body"), " : body");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd...");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "éééééé";
        let cut = truncate_chars(text, 3);
        assert_eq!(cut, "ééé...");
    }

    #[test]
    fn test_build_caps_at_top() {
        let docs = vec![("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")];
        let snippets = policy(3, 100).build(docs);
        assert_eq!(snippets, vec!["a : 1", "b : 2", "c : 3"]);
    }

    #[test]
    fn test_build_empty_yields_placeholder() {
        let docs: Vec<(&str, &str)> = Vec::new();
        let snippets = policy(3, 100).build(docs);
        assert_eq!(snippets, vec!["Aucun document pertinent trouvé."]);
    }

    #[test]
    fn test_build_truncates_each_snippet() {
        let body = "x".repeat(50);
        let snippets = policy(3, 10).build(vec![("t", body.as_str())]);
        assert_eq!(snippets[0], "t : xxxxxx...");
    }

    #[test]
    fn test_format_context_joins_with_newline() {
        let context = format_context(&["a : 1".to_string(), "b : 2".to_string()]);
        assert_eq!(context, "a : 1\nb : 2");
    }

    #[test]
    fn test_status_error_message() {
        let err = SearchError::Status {
            status: 500,
            body: "Internal".to_string(),
        };
        assert_eq!(err.to_string(), "Search service returned 500: Internal");

        let engine: EngineError = err.into();
        assert!(matches!(engine, EngineError::Search(_)));
    }
}
