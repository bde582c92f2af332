//! Configuration validation

use super::{Config, NetcfgConfig};
use crate::dataplane::RelayMode;
use crate::fabric::ConnectPoint;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_logging(config, &mut result);
    validate_bridge(config, &mut result);
    validate_proxy_arp(config, &mut result);
    validate_unicast_dhcp(config, &mut result);
    validate_netcfg(&config.netcfg, &mut result);

    result
}

fn validate_logging(config: &Config, result: &mut ValidationResult) {
    if !config.logging.is_known_level() {
        result.warn(format!(
            "logging.level: unknown level '{}', using info",
            config.logging.level
        ));
    }
    if !config.logging.is_known_format() {
        result.warn(format!(
            "logging.format: unknown format '{}', using pretty",
            config.logging.format
        ));
    }
}

fn validate_bridge(config: &Config, result: &mut ValidationResult) {
    let bridge = &config.bridge;
    if bridge.priority == 0 {
        result.error("bridge.priority: must be greater than 0");
    }
    if bridge.idle_timeout == 0 {
        result.warn("bridge.idle_timeout: 0 installs rules that never idle out");
    }
    if bridge.app_id.is_empty() {
        result.error("bridge.app_id: must not be empty");
    }
    if bridge.max_age_secs == Some(0) {
        result.error("bridge.max_age_secs: must be greater than 0");
    }
}

fn validate_proxy_arp(config: &Config, result: &mut ValidationResult) {
    let proxy = &config.proxy_arp;
    if proxy.app_id.is_empty() {
        result.error("proxy_arp.app_id: must not be empty");
    }
    if proxy.max_age_secs == Some(0) {
        result.error("proxy_arp.max_age_secs: must be greater than 0");
    }
    if proxy.reply_forwarding && proxy.pending_ttl_secs == 0 {
        result.error("proxy_arp.pending_ttl_secs: must be greater than 0 with reply_forwarding");
    }
    if !proxy.reply_forwarding && proxy.pending_ttl_secs != 5 {
        result.warn("proxy_arp.pending_ttl_secs: ignored without reply_forwarding");
    }
}

fn validate_unicast_dhcp(config: &Config, result: &mut ValidationResult) {
    let relay = &config.unicast_dhcp;
    if relay.priority == 0 {
        result.error("unicast_dhcp.priority: must be greater than 0");
    }
    if relay.app_id.is_empty() {
        result.error("unicast_dhcp.app_id: must not be empty");
    }

    let netcfg = &config.netcfg;
    match relay.mode {
        RelayMode::Static => {
            if netcfg.host_location.is_none() {
                result.warn(
                    "netcfg.host_location: not set, static relay waits for a HostConfig record",
                );
            }
            if netcfg.server_location.is_none() {
                result.warn(
                    "netcfg.server_location: not set, relay waits for a UnicastDhcpConfig record",
                );
            }
        }
        RelayMode::Reactive => {
            if netcfg.host_location.is_some() {
                result.warn(
                    "netcfg.host_location: ignored in reactive mode, ingress is learned from packets",
                );
            }
            if netcfg.server_location.is_none() {
                result.warn(
                    "netcfg.server_location: not set, relay waits for a UnicastDhcpConfig record",
                );
            }
        }
    }
}

fn validate_netcfg(netcfg: &NetcfgConfig, result: &mut ValidationResult) {
    for (field, token) in [
        ("host_location", &netcfg.host_location),
        ("server_location", &netcfg.server_location),
    ] {
        if let Some(token) = token {
            if let Err(e) = token.parse::<ConnectPoint>() {
                result.error(format!("netcfg.{}: {}", field, e));
            }
        }
    }
}
