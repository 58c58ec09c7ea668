//! Command handlers for CLI operations
//!
//! - serve: run the HTTP server
//! - ask: one search-then-answer turn
//! - chat: interactive conversation on stdin
//! - doctor: validate configuration and secrets
//! - secret: manage keychain entries

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::SecretAction;
use crate::config::Config;
use crate::conversation::{ConversationOrchestrator, MemoryConversationStore, TurnSampling};
use crate::llm::azure_openai::AzureOpenAIProvider;
use crate::search::azure::AzureSearchClient;
use crate::secrets::{
    SecretCache, SecretManager, ALL_SECRETS, COMPLETION_API_KEY, LOGIN_PASSWORD, SEARCH_API_KEY,
};
use crate::server::{self, AppState};

/// Keychain service name
const SERVICE_NAME: &str = "ragchat";

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Secret cache backed by the environment and the OS keychain
pub fn secret_cache() -> SecretCache {
    SecretCache::new(Arc::new(SecretManager::new(SERVICE_NAME)))
}

/// Wire the Azure clients, the store and the prompts into an orchestrator
pub fn build_orchestrator(config: &Config, secrets: &SecretCache) -> Result<ConversationOrchestrator> {
    config.require_endpoints()?;

    let search = AzureSearchClient::from_config(
        &config.search,
        config.prompts.no_documents.clone(),
        secrets,
    )
    .context("Failed to set up the search client")?;

    let generator = AzureOpenAIProvider::from_config(&config.completion, secrets)
        .context("Failed to set up the completion client")?;

    let store = MemoryConversationStore::from_config(&config.conversations);

    Ok(ConversationOrchestrator::new(
        Arc::new(search),
        Arc::new(generator),
        Arc::new(store),
    )
    .with_prompts(config.prompts.clone())
    .with_sampling(TurnSampling::from(&config.completion)))
}

/// Run the HTTP server until Ctrl-C
pub async fn handle_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let secrets = secret_cache();
    secrets
        .preload(&ALL_SECRETS)
        .context("All secrets must be resolvable before serving")?;
    let password = secrets
        .get_secret(LOGIN_PASSWORD)
        .context("The login password is required to serve")?;

    let orchestrator = Arc::new(build_orchestrator(config, &secrets)?);
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());

    if !config.server.static_root.exists() {
        tracing::warn!(
            "Static root {} does not exist; pages will return 404",
            config.server.static_root.display()
        );
    }

    let state = AppState::new(orchestrator, password, config.server.clone());
    server::serve(state, &addr).await?;
    Ok(())
}

/// Ask one question and print the answer
pub async fn handle_ask(
    config: &Config,
    question: String,
    user: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let secrets = secret_cache();
    let orchestrator = build_orchestrator(config, &secrets)?;
    let user_id = user.unwrap_or_else(|| config.server.default_user_id.clone());

    let result = orchestrator.start_conversation(&user_id, &question).await;

    // Already reported; only the exit status is left to set
    if !print_turn(&result, format)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Interactive conversation on stdin.
///
/// The first line starts a conversation, each later line continues it.
/// A failed first turn leaves no conversation, so the next line starts again.
pub async fn handle_chat(config: &Config, user: Option<String>, format: OutputFormat) -> Result<()> {
    let secrets = secret_cache();
    let orchestrator = build_orchestrator(config, &secrets)?;
    let user_id = user.unwrap_or_else(|| config.server.default_user_id.clone());

    if let OutputFormat::Text = format {
        println!("Chat session for '{}'. Ctrl-D to quit.", user_id);
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        let result = if orchestrator.has_conversation(&user_id) {
            orchestrator.continue_conversation(&user_id, question).await
        } else {
            orchestrator.start_conversation(&user_id, question).await
        };

        print_turn(&result, format)?;
    }

    tracing::debug!(
        turns = orchestrator
            .transcript(&user_id)
            .map(|t| t.turns())
            .unwrap_or(0),
        "Chat session ended"
    );
    Ok(())
}

/// Print an answer or a turn error; returns whether the turn succeeded
fn print_turn<E: std::fmt::Display>(
    result: &std::result::Result<String, E>,
    format: OutputFormat,
) -> Result<bool> {
    match (result, format) {
        (Ok(answer), OutputFormat::Text) => {
            println!("{}", answer);
            println!();
        }
        (Ok(answer), OutputFormat::Json) => {
            println!("{}", serde_json::to_string(&json!({ "answer": answer }))?);
        }
        (Err(e), OutputFormat::Text) => {
            eprintln!("✗ {}", e);
        }
        (Err(e), OutputFormat::Json) => {
            println!("{}", serde_json::to_string(&json!({ "error": e.to_string() }))?);
        }
    }
    Ok(result.is_ok())
}

/// Validate configuration, endpoints, secrets and frontend files
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks: Vec<(String, &str)> = Vec::new();

    // Config is validated when loaded
    checks.push(("Configuration".to_string(), "Valid"));

    match config.require_endpoints() {
        Ok(()) => checks.push(("Service endpoints".to_string(), "Configured")),
        Err(e) => {
            checks.push(("Service endpoints".to_string(), "Missing"));
            issues.push(e.to_string());
        }
    }

    let manager = SecretManager::new(SERVICE_NAME);
    for key in ALL_SECRETS {
        if manager.has_secret(key) {
            checks.push((key.to_string(), "Configured"));
        } else {
            checks.push((key.to_string(), "Not configured"));
            issues.push(format!(
                "Secret '{}' is missing. Set {} or run 'ragchat secret set {}'.",
                key,
                SecretManager::env_var_name(key),
                key
            ));
        }
    }

    let root = &config.server.static_root;
    for page in ["login.html", "index.html"] {
        if root.join(page).exists() {
            checks.push((page.to_string(), "Found"));
        } else {
            checks.push((page.to_string(), "Missing"));
            issues.push(format!("{} not found under {}", page, root.display()));
        }
    }

    match format {
        OutputFormat::Text => {
            println!("ragchat Diagnostics");
            println!("===================");
            println!();

            println!("Checks:");
            for (check, status) in &checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Store or delete a keychain secret
pub async fn handle_secret(action: SecretAction, format: OutputFormat) -> Result<()> {
    let manager = SecretManager::new(SERVICE_NAME);

    let (key, verb) = match action {
        SecretAction::Set { key } => {
            ensure_known_secret(&key)?;
            let value = manager.prompt_for_secret(&key)?;
            manager.set_secret(&key, &value)?;
            (key, "stored")
        }
        SecretAction::Delete { key } => {
            ensure_known_secret(&key)?;
            manager.delete_secret(&key)?;
            (key, "deleted")
        }
    };

    match format {
        OutputFormat::Text => println!("✓ Secret '{}' {}", key, verb),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "key": key, "status": verb }))?
        ),
    }
    Ok(())
}

fn ensure_known_secret(key: &str) -> Result<()> {
    if ALL_SECRETS.contains(&key) {
        Ok(())
    } else {
        anyhow::bail!(
            "Unknown secret '{}'. Expected one of: {}, {}, {}",
            key,
            SEARCH_API_KEY,
            COMPLETION_API_KEY,
            LOGIN_PASSWORD
        )
    }
}
