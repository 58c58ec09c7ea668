use super::{CompletionProvider, LLMError, Message, SamplingParams};
use crate::config::CompletionConfig;
use crate::secrets::{scrub_secrets, SecretCache, SecretString, COMPLETION_API_KEY};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Azure OpenAI chat-completions client
///
/// Posts `{messages, temperature, max_tokens, top_p, n}` to a fully
/// qualified deployment URL and authenticates with the `api-key` header.
pub struct AzureOpenAIProvider {
    url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl AzureOpenAIProvider {
    pub fn new(
        url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, LLMError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            api_key,
            client,
        })
    }

    /// Build a provider from configuration, resolving the API key through
    /// the secret cache.
    pub fn from_config(config: &CompletionConfig, secrets: &SecretCache) -> Result<Self, LLMError> {
        let api_key = secrets
            .get_secret(COMPLETION_API_KEY)
            .map_err(|e| LLMError::AuthenticationFailed(e.to_string()))?;

        Self::new(
            config.url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl CompletionProvider for AzureOpenAIProvider {
    fn name(&self) -> &str {
        "azure_openai"
    }

    async fn generate(&self, messages: &[Message], params: &SamplingParams) -> super::Result<String> {
        let payload = json!({
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "top_p": params.top_p,
            "n": params.n,
        });

        tracing::debug!(
            messages = messages.len(),
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "Sending completion request"
        );

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
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = scrub_secrets(&response.text().await.unwrap_or_default());
            tracing::warn!(status, "Completion service returned an error");
            return Err(LLMError::Status { status, body });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

        let message = choice
            .get("message")
            .ok_or_else(|| LLMError::ParseError("No message in choice".to_string()))?;

        message
            .get("content")
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))
    }
}
