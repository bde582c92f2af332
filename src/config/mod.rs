//! Configuration management
//!
//! Handles switchboard.toml (app settings plus startup network-config
//! records) and switchboard.lock (the same settings with every default
//! written out).

mod netcfg;
mod types;
mod validation;

pub use netcfg::{
    parse_record, translate, ConfigClass, ConfigProvider, EndpointPairConfig, NetworkConfigEvent,
    NetworkConfigEventType, NetworkConfigStore,
};
pub use types::*;
pub use validation::{validate, ValidationResult};

use crate::{Error, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// Render a config with all defaults filled in
pub fn generate_lock(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))
}
