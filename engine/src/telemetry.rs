//! Telemetry and Observability
//!
//! Handles setting up `tracing-subscriber` for structured logging.
//! Supports config-driven log levels, environment variable overrides,
//! and format switching between pretty (debug) and JSON (release).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a level: applies to everything and to this crate.
///
/// HTTP plumbing crates stay at `warn` unless the level asks for more.
pub fn default_filter(log_level: &str) -> String {
    let plumbing = match log_level {
        "debug" | "trace" => log_level,
        _ => "warn",
    };
    format!(
        "{level},ragchat_engine={level},hyper={plumbing},reqwest={plumbing}",
        level = log_level,
        plumbing = plumbing
    )
}

/// Initialize the tracing subscriber with the given log level from config.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter > default "info"
///
/// In debug builds: pretty-printed terminal output.
/// In release builds: JSON structured output with spans.
///
/// Logs go to stderr so command output on stdout stays clean.
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_plumbing() {
        let filter = default_filter("info");
        assert!(filter.starts_with("info,ragchat_engine=info"));
        assert!(filter.contains("hyper=warn"));
    }

    #[test]
    fn test_default_filter_debug_passthrough() {
        let filter = default_filter("debug");
        assert!(filter.contains("reqwest=debug"));
    }
}
