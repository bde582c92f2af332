//! Logging configuration and initialization.
//!
//! Level comes from `RUST_LOG`, then the `[logging]` section of
//! switchboard.toml, then `info`. Output is pretty, compact or json.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// error, warn, info, debug, trace
    pub level: String,
    /// pretty, compact, json
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }

    pub fn is_known_format(&self) -> bool {
        matches!(self.format.as_str(), "pretty" | "compact" | "json")
    }

    pub fn is_known_level(&self) -> bool {
        level_from_str(&self.level).is_some()
    }
}

/// Install the global subscriber
///
/// Returns false if one was already installed (tests, or a second call
/// after the config file has been read). Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_logging(config: Option<&LogConfig>) -> bool {
    let env_filter = match (std::env::var("RUST_LOG"), config) {
        (Ok(_), _) => EnvFilter::from_default_env(),
        (Err(_), Some(cfg)) => EnvFilter::new(parse_level(&cfg.level).as_str()),
        (Err(_), None) => EnvFilter::new("info"),
    };

    let format = config.map(|c| c.format.as_str()).unwrap_or("pretty");
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        "json" => tracing::subscriber::set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE),
            ),
        ),
        "compact" => tracing::subscriber::set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            ),
        ),
        _ => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };
    installed.is_ok()
}

fn level_from_str(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Unknown names fall back to INFO
fn parse_level(level: &str) -> Level {
    level_from_str(level).unwrap_or(Level::INFO)
}
