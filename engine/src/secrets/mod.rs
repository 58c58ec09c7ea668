pub mod cache;
pub mod string;

pub use cache::SecretCache;
pub use string::SecretString;

use keyring::Entry;
use regex::Regex;
use sdk::errors::EngineError;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Key of the document-search API key
pub const SEARCH_API_KEY: &str = "azure_search_api_key";

/// Key of the completion API key
pub const COMPLETION_API_KEY: &str = "azure_openai_key";

/// Key of the shared login password
pub const LOGIN_PASSWORD: &str = "valid_password";

/// Every secret the engine may ask for
pub const ALL_SECRETS: [&str; 3] = [SEARCH_API_KEY, COMPLETION_API_KEY, LOGIN_PASSWORD];

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// SecretManager resolves secrets from the environment or the OS keychain.
///
/// Lookup order for a key such as `azure_openai_key`:
/// 1. environment variable `AZURE_OPENAI_KEY` (non-empty)
/// 2. OS keychain entry `azure_openai_key` under the service name
///
/// Secrets are stored in the keychain of the host:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
///
/// The SecretManager also provides secret scrubbing to remove sensitive
/// data from log output and error messages.
pub struct SecretManager {
    service_name: String,
    env: EnvLookup,
}

/// Regex patterns for detecting common secret formats.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - OpenAI API keys: sk-[a-zA-Z0-9]{20,}
/// - `api-key` header echoes: api-key: <value>
/// - Bearer tokens: Bearer\s+[^\s]{20,}
/// - Azure 32-character hex keys
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"sk-[a-zA-Z0-9\-_]{20,}",
            r#"(?i)api-key["']?\s*[:=]\s*["']?[^\s"',}]+"#,
            r"Bearer\s+[^\s]{20,}",
            r"\b[a-fA-F0-9]{32}\b",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Replace anything that looks like a credential with `[REDACTED]`.
///
/// Applied to upstream response bodies before they reach logs or users.
pub fn scrub_secrets(text: &str) -> String {
    get_secret_patterns()
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "[REDACTED]").into_owned()
        })
}

impl SecretManager {
    /// Creates a new SecretManager reading the process environment.
    ///
    /// The service name namespaces secrets in the OS keychain.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self::with_env(service_name, |name| std::env::var(name).ok())
    }

    /// Creates a SecretManager with a custom environment lookup.
    pub fn with_env<F>(service_name: impl Into<String>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            service_name: service_name.into(),
            env: Box::new(env),
        }
    }

    /// Environment variable consulted for `key`
    pub fn env_var_name(key: &str) -> String {
        key.to_uppercase()
    }

    /// Retrieves a secret from the environment, then the OS keychain.
    ///
    /// # Errors
    /// - `EngineError::SecretNotFound` if neither source has the key
    /// - `EngineError::KeyringError` if keychain access fails
    pub fn get_secret(&self, key: &str) -> Result<String, EngineError> {
        if let Some(value) = self.from_env(key) {
            tracing::debug!("Resolved secret '{}' from environment", key);
            return Ok(value);
        }

        let entry = self.entry(key)?;
        match entry.get_password() {
            Ok(secret) => {
                tracing::debug!("Retrieved secret '{}' from keychain", key);
                Ok(secret)
            }
            Err(keyring::Error::NoEntry) => Err(EngineError::SecretNotFound(format!(
                "{} (set {} or store it with 'ragchat secret set {}')",
                key,
                Self::env_var_name(key),
                key
            ))),
            Err(e) => Err(EngineError::KeyringError(format!(
                "Failed to retrieve secret '{}': {}",
                key, e
            ))),
        }
    }

    /// Stores a secret in the OS keychain.
    ///
    /// # Errors
    /// Returns `EngineError::KeyringError` if keychain access fails
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), EngineError> {
        self.entry(key)?.set_password(value).map_err(|e| {
            EngineError::KeyringError(format!("Failed to store secret '{}': {}", key, e))
        })?;

        tracing::info!("Stored secret '{}' in keychain", key);
        Ok(())
    }

    /// Deletes a secret from the OS keychain.
    ///
    /// # Errors
    /// Returns `EngineError::KeyringError` if keychain access fails
    pub fn delete_secret(&self, key: &str) -> Result<(), EngineError> {
        self.entry(key)?.delete_password().map_err(|e| {
            EngineError::KeyringError(format!("Failed to delete secret '{}': {}", key, e))
        })?;

        tracing::info!("Deleted secret '{}' from keychain", key);
        Ok(())
    }

    /// Checks whether a secret can be resolved, without prompting.
    pub fn has_secret(&self, key: &str) -> bool {
        if self.from_env(key).is_some() {
            return true;
        }

        match Entry::new(&self.service_name, key) {
            Ok(entry) => entry.get_password().is_ok(),
            Err(_) => false,
        }
    }

    /// Prompts for a secret value on stderr and reads it from stdin.
    ///
    /// # Errors
    /// Returns `EngineError::KeyringError` if I/O fails or the value is empty
    pub fn prompt_for_secret(&self, key: &str) -> Result<String, EngineError> {
        eprint!("Enter value for '{}': ", key);
        io::stderr()
            .flush()
            .map_err(|e| EngineError::KeyringError(format!("Failed to flush stderr: {}", e)))?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| EngineError::KeyringError(format!("Failed to read input: {}", e)))?;

        let secret = input.trim().to_string();
        if secret.is_empty() {
            return Err(EngineError::KeyringError(
                "Secret value cannot be empty".to_string(),
            ));
        }

        Ok(secret)
    }

    fn from_env(&self, key: &str) -> Option<String> {
        (self.env)(&Self::env_var_name(key)).filter(|v| !v.trim().is_empty())
    }

    fn entry(&self, key: &str) -> Result<Entry, EngineError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            EngineError::KeyringError(format!("Failed to create keyring entry: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(vars: &'static [(&'static str, &'static str)]) -> SecretManager {
        SecretManager::with_env("ragchat-test", move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(
            SecretManager::env_var_name(COMPLETION_API_KEY),
            "AZURE_OPENAI_KEY"
        );
        assert_eq!(SecretManager::env_var_name(LOGIN_PASSWORD), "VALID_PASSWORD");
    }

    #[test]
    fn test_secret_from_environment() {
        let manager = manager_with(&[("AZURE_SEARCH_API_KEY", "search-key")]);
        assert_eq!(manager.get_secret(SEARCH_API_KEY).unwrap(), "search-key");
        assert!(manager.has_secret(SEARCH_API_KEY));
    }

    #[test]
    fn test_blank_environment_value_ignored() {
        let manager = manager_with(&[("VALID_PASSWORD", "  ")]);
        assert_eq!(manager.from_env(LOGIN_PASSWORD), None);
    }

    #[test]
    fn test_scrub_api_key_header() {
        let scrubbed = scrub_secrets(r#"{"error": "bad header api-key: abc123secret"}"#);
        assert!(!scrubbed.contains("abc123secret"));
        assert!(scrubbed.contains("[REDACTED]"));
    }

    #[test]
    fn test_scrub_hex_key() {
        let scrubbed = scrub_secrets("key 0123456789abcdef0123456789abcdef rejected");
        assert_eq!(scrubbed, "key [REDACTED] rejected");
    }

    #[test]
    fn test_scrub_openai_key() {
        let scrubbed = scrub_secrets("Invalid key sk-proj-abcdefghijklmnopqrstuvwxyz");
        assert!(!scrubbed.contains("sk-proj"));
    }

    #[test]
    fn test_scrub_leaves_plain_text() {
        let text = "Erreur : index introuvable";
        assert_eq!(scrub_secrets(text), text);
    }
}
