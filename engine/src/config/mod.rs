//! Configuration management
//!
//! This module handles loading, validation, and management of the ragchat
//! configuration. Configuration is stored in TOML format at
//! ~/.ragchat/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: log level
//! - **server**: bind address, static files, session cookie, default user
//! - **search**: document-search endpoint, index, result limits, timeout
//! - **completion**: completion endpoint, timeout, sampling presets
//! - **prompts**: system instructions and the no-document placeholder
//! - **conversations**: eviction limits for the in-memory store
//!
//! API keys and the login password are never stored here; see
//! [`crate::secrets`].
//!
//! # Environment Overrides
//!
//! Endpoints are usually provisioned per deployment, so the following
//! variables take precedence over the file:
//!
//! - `AZURE_SEARCH_ENDPOINT` -> `search.endpoint`
//! - `AZURE_SEARCH_INDEX` -> `search.index`
//! - `AZURE_OPENAI_URL` -> `completion.url`
//! - `RAGCHAT_BIND` -> `server.bind`
//!
//! # Examples
//!
//! ```no_run
//! use ragchat_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Search index: {}", config.search.index);
//! println!("Top documents: {}", config.search.top);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::SamplingParams;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Document-search service settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Completion service settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Prompt texts
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Conversation store limits
    #[serde(default)]
    pub conversations: ConversationsConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory holding `login.html`, `index.html` and `static/`
    #[serde(default = "default_static_root")]
    pub static_root: PathBuf,

    /// Name of the session cookie
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Seconds a login stays valid; 0 keeps sessions until logout
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// User identifier used when a request omits `user_id`
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
}

/// Document-search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Service base URL, e.g. `https://<name>.search.windows.net`
    #[serde(default)]
    pub endpoint: String,

    /// Index to query
    #[serde(default)]
    pub index: String,

    /// REST API version query parameter
    #[serde(default = "default_search_api_version")]
    pub api_version: String,

    /// Number of documents requested and kept
    #[serde(default = "default_top")]
    pub top: usize,

    /// Character budget per snippet before the ellipsis marker
    #[serde(default = "default_max_chars_per_doc")]
    pub max_chars_per_doc: usize,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    // Note: API key resolved through SecretManager, not stored in config
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Full chat-completions URL including deployment and api-version
    #[serde(default)]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,

    /// Sampling used for the first, context-grounded answer
    #[serde(default = "SamplingParams::initial")]
    pub initial: SamplingParams,

    /// Sampling used for follow-up turns
    #[serde(default = "SamplingParams::follow_up")]
    pub follow_up: SamplingParams,
    // Note: API key resolved through SecretManager, not stored in config
}

/// Prompt texts injected into the message lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// System instruction for the search-grounded first turn
    #[serde(default = "default_rag_system")]
    pub rag_system: String,

    /// System instruction stored at the head of every transcript
    #[serde(default = "default_follow_up_system")]
    pub follow_up_system: String,

    /// Snippet substituted when the search returns nothing
    #[serde(default = "default_no_documents")]
    pub no_documents: String,
}

/// Conversation store limits. A value of 0 disables the limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsConfig {
    /// Maximum number of conversations kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Seconds of inactivity after which a conversation is dropped
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_static_root() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_session_cookie() -> String {
    "session_rag".to_string()
}

fn default_session_ttl() -> u64 {
    14 * 24 * 60 * 60
}

fn default_user_id() -> String {
    "demo_user".to_string()
}

fn default_search_api_version() -> String {
    "2021-04-30-Preview".to_string()
}

fn default_top() -> usize {
    3
}

fn default_max_chars_per_doc() -> usize {
    1200
}

fn default_search_timeout() -> u64 {
    30
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_rag_system() -> String {
    concat!(
        "Vous êtes un assistant fiscal expert en fiscalité française. ",
        "Vous assistez les conseillers en patrimoine, experts comptables et avocats fiscalistes. ",
        "Votre rôle est de fournir des réponses claires, précises et personnalisées ",
        "en matière d'optimisation fiscale, en tenant compte des lois en vigueur ",
        "(Code Général des Impôts, BOFiP, etc.). ",
        "Répondez de manière concise et pratique, en priorisant les solutions applicables."
    )
    .to_string()
}

fn default_follow_up_system() -> String {
    concat!(
        "Vous êtes un assistant fiscal expert en fiscalité française. ",
        "Dans cette conversation, vous avez déjà utilisé des documents externes ",
        "pour fournir une première réponse. Pour les questions suivantes, ",
        "vous n'accéderez plus aux documents, mais vous garderez en mémoire ",
        "le contexte de la discussion. Répondez de manière claire et concise, ",
        "en conservant toutes les informations précédemment discutées."
    )
    .to_string()
}

fn default_no_documents() -> String {
    "Aucun document pertinent trouvé.".to_string()
}

fn default_max_entries() -> usize {
    1000
}

fn default_idle_ttl() -> u64 {
    24 * 60 * 60
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_root: default_static_root(),
            session_cookie: default_session_cookie(),
            session_ttl_secs: default_session_ttl(),
            default_user_id: default_user_id(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            index: String::new(),
            api_version: default_search_api_version(),
            top: default_top(),
            max_chars_per_doc: default_max_chars_per_doc(),
            timeout_secs: default_search_timeout(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_completion_timeout(),
            initial: SamplingParams::initial(),
            follow_up: SamplingParams::follow_up(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            rag_system: default_rag_system(),
            follow_up_system: default_follow_up_system(),
            no_documents: default_no_documents(),
        }
    }
}

impl Default for ConversationsConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            idle_ttl_secs: default_idle_ttl(),
        }
    }
}

impl SearchConfig {
    /// Full URL of the search endpoint for the configured index
    pub fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.index,
            self.api_version
        )
    }
}

impl Config {
    /// Load configuration from the default location (~/.ragchat/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Environment overrides are applied and the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text without environment overrides
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Created default configuration at {}", path.display());

        let mut config = config;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path (~/.ragchat/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".ragchat").join("config.toml"))
    }

    /// Replace endpoint settings with deployment environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get("AZURE_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }
        if let Some(index) = get("AZURE_SEARCH_INDEX") {
            self.search.index = index;
        }
        if let Some(url) = get("AZURE_OPENAI_URL") {
            self.completion.url = url;
        }
        if let Some(bind) = get("RAGCHAT_BIND") {
            self.server.bind = bind;
        }
    }

    /// Validate value ranges
    ///
    /// Endpoints may be empty here; commands that talk to the services call
    /// [`Config::require_endpoints`].
    pub fn validate(&self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.search.top == 0 {
            return Err(EngineError::Config(
                "search.top must be at least 1".to_string(),
            ));
        }
        if self.search.max_chars_per_doc == 0 {
            return Err(EngineError::Config(
                "search.max_chars_per_doc must be at least 1".to_string(),
            ));
        }
        if self.search.timeout_secs == 0 || self.completion.timeout_secs == 0 {
            return Err(EngineError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        self.completion.initial.validate("completion.initial")?;
        self.completion.follow_up.validate("completion.follow_up")?;

        if self.server.session_cookie.trim().is_empty() {
            return Err(EngineError::Config(
                "server.session_cookie must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Ensure both outbound services are addressable
    pub fn require_endpoints(&self) -> Result<(), EngineError> {
        let mut missing = Vec::new();
        if self.search.endpoint.trim().is_empty() {
            missing.push("search.endpoint (AZURE_SEARCH_ENDPOINT)");
        }
        if self.search.index.trim().is_empty() {
            missing.push("search.index (AZURE_SEARCH_INDEX)");
        }
        if self.completion.url.trim().is_empty() {
            missing.push("completion.url (AZURE_OPENAI_URL)");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.search.top, 3);
        assert_eq!(config.search.max_chars_per_doc, 1200);
        assert_eq!(config.search.timeout_secs, 30);
        assert_eq!(config.completion.timeout_secs, 60);
        assert_eq!(config.server.session_cookie, "session_rag");
        assert_eq!(config.server.default_user_id, "demo_user");
        assert_eq!(config.server.session_ttl_secs, 1_209_600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_url() {
        let search = SearchConfig {
            endpoint: "https://demo.search.windows.net/".to_string(),
            index: "fiscal".to_string(),
            ..Default::default()
        };

        assert_eq!(
            search.search_url(),
            "https://demo.search.windows.net/indexes/fiscal/docs/search?api-version=2021-04-30-Preview"
        );
    }

    #[test]
    fn test_overrides_replace_endpoints() {
        let vars: HashMap<&str, &str> = [
            ("AZURE_SEARCH_ENDPOINT", "https://env.search.windows.net"),
            ("AZURE_SEARCH_INDEX", "env-index"),
            ("AZURE_OPENAI_URL", "https://env.openai.azure.com/chat"),
            ("RAGCHAT_BIND", "0.0.0.0:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.search.endpoint, "https://env.search.windows.net");
        assert_eq!(config.search.index, "env-index");
        assert_eq!(config.completion.url, "https://env.openai.azure.com/chat");
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_blank_override_ignored() {
        let mut config = Config::default();
        config.search.index = "kept".to_string();
        config.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.search.index, "kept");
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.core.log_level = "verbose".to_string();
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_zero_top_rejected() {
        let mut config = Config::default();
        config.search.top = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_endpoints_lists_missing() {
        let config = Config::default();
        let err = config.require_endpoints().unwrap_err().to_string();
        assert!(err.contains("AZURE_SEARCH_ENDPOINT"));
        assert!(err.contains("AZURE_SEARCH_INDEX"));
        assert!(err.contains("AZURE_OPENAI_URL"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.search.top, deserialized.search.top);
        assert_eq!(
            config.completion.follow_up,
            deserialized.completion.follow_up
        );
    }
}
