//! CLI interface for ragchat
//!
//! Defines the commands and global flags using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RAG chat backend
///
/// Answers questions from an Azure AI Search index through an Azure OpenAI
/// chat deployment, over HTTP or from the terminal.
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Ask a single question (search + answer)
    Ask {
        /// The question to ask
        question: String,

        /// Conversation key
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Interactive chat: the first line starts a conversation, later lines continue it
    Chat {
        /// Conversation key
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Check configuration and secrets
    Doctor,

    /// Manage secrets stored in the OS keychain
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
}

/// Keychain secret actions
#[derive(Subcommand, Debug)]
pub enum SecretAction {
    /// Prompt for a value and store it
    Set {
        /// Secret key (azure_search_api_key, azure_openai_key, valid_password)
        key: String,
    },

    /// Remove a stored value
    Delete {
        /// Secret key
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::try_parse_from(["ragchat", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { bind: None }));
    }

    #[test]
    fn test_cli_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["ragchat", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Command::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:9000")),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli =
            Cli::try_parse_from(["ragchat", "ask", "Qu'est-ce que RAG ?", "--user", "alice"])
                .unwrap();
        match cli.command {
            Command::Ask { question, user } => {
                assert_eq!(question, "Qu'est-ce que RAG ?");
                assert_eq!(user.as_deref(), Some("alice"));
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::try_parse_from(["ragchat", "chat"]).unwrap();
        assert!(matches!(cli.command, Command::Chat { user: None }));
    }

    #[test]
    fn test_cli_parse_secret_set() {
        let cli = Cli::try_parse_from(["ragchat", "secret", "set", "azure_openai_key"]).unwrap();
        match cli.command {
            Command::Secret {
                action: SecretAction::Set { key },
            } => assert_eq!(key, "azure_openai_key"),
            _ => panic!("Expected Secret Set command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "ragchat",
            "--json",
            "--log",
            "debug",
            "--config",
            "/tmp/ragchat.toml",
            "doctor",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ragchat.toml")));
        assert!(matches!(cli.command, Command::Doctor));
    }

    #[test]
    fn test_cli_ask_requires_question() {
        assert!(Cli::try_parse_from(["ragchat", "ask"]).is_err());
    }
}
