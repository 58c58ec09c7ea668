use super::{SearchError, SearchProvider, SnippetPolicy};
use crate::config::SearchConfig;
use crate::secrets::{scrub_secrets, SecretCache, SecretString, SEARCH_API_KEY};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Azure Cognitive Search client
///
/// Posts `{search, top}` to `/indexes/{index}/docs/search` and reads the
/// `value` array of the response.
pub struct AzureSearchClient {
    url: String,
    api_key: SecretString,
    policy: SnippetPolicy,
    client: reqwest::Client,
}

impl AzureSearchClient {
    pub fn new(
        url: impl Into<String>,
        api_key: SecretString,
        policy: SnippetPolicy,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            api_key,
            policy,
            client,
        })
    }

    /// Build a client from configuration, resolving the API key through the
    /// secret cache.
    pub fn from_config(
        config: &SearchConfig,
        placeholder: impl Into<String>,
        secrets: &SecretCache,
    ) -> Result<Self, SearchError> {
        let api_key = secrets
            .get_secret(SEARCH_API_KEY)
            .map_err(|e| SearchError::Authentication(e.to_string()))?;

        let policy = SnippetPolicy {
            top: config.top,
            max_chars: config.max_chars_per_doc,
            placeholder: placeholder.into(),
        };

        Self::new(
            config.search_url(),
            api_key,
            policy,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

/// Pull `(title, content-or-text)` out of one search hit.
///
/// Numbers and booleans are rendered as text. Null, missing or structured
/// fields read as empty; an empty `content` falls back to `text`.
fn document_fields(doc: &serde_json::Value) -> (String, String) {
    let field = |name: &str| match doc.get(name) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    };

    let title = field("title");
    let content = field("content");
    let body = if content.is_empty() {
        field("text")
    } else {
        content
    };

    (title, body)
}

#[async_trait]
impl SearchProvider for AzureSearchClient {
    fn name(&self) -> &str {
        "azure_search"
    }

    async fn search(&self, question: &str) -> super::Result<Vec<String>> {
        let payload = json!({
            "search": question,
            "top": self.policy.top,
        });

        let response = self
            .client
            .post(&self.url)
            .header("api-key", self.api_key.unsecure())
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = scrub_secrets(&response.text().await.unwrap_or_default());
            tracing::warn!(status, "Search service returned an error");
            return Err(SearchError::Status { status, body });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let documents: Vec<(String, String)> = data
            .get("value")
            .and_then(|v| v.as_array())
            .map(|hits| hits.iter().map(document_fields).collect())
            .unwrap_or_default();

        tracing::debug!(hits = documents.len(), "Search completed");

        Ok(self.policy.build(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fields_prefers_content() {
        let doc = json!({"title": "T", "content": "C", "text": "X"});
        assert_eq!(document_fields(&doc), ("T".to_string(), "C".to_string()));
    }

    #[test]
    fn test_document_fields_falls_back_to_text() {
        let doc = json!({"title": "T", "content": "", "text": "X"});
        assert_eq!(document_fields(&doc).1, "X");

        let doc = json!({"title": "T", "text": "X"});
        assert_eq!(document_fields(&doc).1, "X");
    }

    #[test]
    fn test_document_fields_missing_values() {
        let doc = json!({"content": null, "title": null});
        assert_eq!(document_fields(&doc), (String::new(), String::new()));

        let doc = json!({"title": ["a"], "content": {"k": 1}});
        assert_eq!(document_fields(&doc), (String::new(), String::new()));
    }

    #[test]
    fn test_document_fields_render_scalars() {
        let doc = json!({"title": 42, "content": true});
        assert_eq!(document_fields(&doc), ("42".to_string(), "true".to_string()));

        let doc = json!({"title": 2.5, "content": null, "text": 7});
        assert_eq!(document_fields(&doc), ("2.5".to_string(), "7".to_string()));
    }
}
