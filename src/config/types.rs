//! Configuration types

use crate::dataplane::{
    app_ids, BridgeSettings, ProxyArpSettings, RelayMode, RelaySettings,
};
use crate::fabric::{ApplicationId, ConnectPoint};
use crate::telemetry::LogConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User-defined configuration (switchboard.toml)
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LogConfig,
    pub bridge: BridgeConfig,
    pub proxy_arp: ProxyArpConfig,
    pub unicast_dhcp: UnicastDhcpConfig,
    pub netcfg: NetcfgConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub app_id: String,
    pub priority: u16,
    /// Idle timeout of installed rules, in seconds
    pub idle_timeout: u64,
    /// Forget learned locations after this long; unset keeps them forever
    pub max_age_secs: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_id: app_ids::BRIDGE.to_string(),
            priority: 30,
            idle_timeout: 30,
            max_age_secs: None,
        }
    }
}

impl BridgeConfig {
    pub fn settings(&self) -> BridgeSettings {
        BridgeSettings {
            app_id: ApplicationId::new(&self.app_id),
            priority: self.priority,
            idle_timeout: Duration::from_secs(self.idle_timeout),
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyArpConfig {
    pub app_id: String,
    pub max_age_secs: Option<u64>,
    /// Send replies back to the requester of a flooded request
    pub reply_forwarding: bool,
    pub pending_ttl_secs: u64,
}

impl Default for ProxyArpConfig {
    fn default() -> Self {
        Self {
            app_id: app_ids::PROXY_ARP.to_string(),
            max_age_secs: None,
            reply_forwarding: false,
            pending_ttl_secs: 5,
        }
    }
}

impl ProxyArpConfig {
    pub fn settings(&self) -> ProxyArpSettings {
        ProxyArpSettings {
            app_id: ApplicationId::new(&self.app_id),
            reply_forwarding: self.reply_forwarding,
            pending_ttl: Duration::from_secs(self.pending_ttl_secs),
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UnicastDhcpConfig {
    pub app_id: String,
    pub mode: RelayMode,
    pub priority: u16,
}

impl Default for UnicastDhcpConfig {
    fn default() -> Self {
        Self {
            app_id: app_ids::UNICAST_DHCP.to_string(),
            mode: RelayMode::Static,
            priority: 50000,
        }
    }
}

impl UnicastDhcpConfig {
    pub fn settings(&self) -> RelaySettings {
        RelaySettings {
            app_id: ApplicationId::new(&self.app_id),
            mode: self.mode,
            priority: self.priority,
        }
    }
}

/// Network-config records to load at startup
///
/// Kept as raw `"<device>/<port>"` tokens so validation can report a bad
/// one instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetcfgConfig {
    pub host_location: Option<String>,
    pub server_location: Option<String>,
}

/// `HostConfig` network-config record: where the DHCP client attaches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostConfig {
    pub host_location: ConnectPoint,
}

/// `UnicastDhcpConfig` network-config record: where the DHCP server attaches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DhcpConfig {
    pub server_location: ConnectPoint,
}
