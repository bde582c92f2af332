//! Decision engines
//!
//! Learning tables, packet classification, and the three engines that
//! turn an observed packet or config change into a forwarding decision.

mod bridge;
mod classifier;
mod decision;
mod proxy_arp;
mod relay;
mod tables;

pub use bridge::{BridgeSettings, LearningBridge};
pub use classifier::{classify, classify_frame, PacketClass};
pub use decision::{Decision, Dependency, DropReason};
pub use proxy_arp::{ProxyArp, ProxyArpSettings};
pub use relay::{
    dhcp_selector, EndpointPair, EndpointRole, RelayEvent, RelayMode, RelaySettings,
    UnicastRelay,
};
pub use tables::{ArpTable, ConnectPointCache, KeyedTable, LearningTable};

/// Default owning-application names
pub mod app_ids {
    pub use super::bridge::DEFAULT_APP_ID as BRIDGE;
    pub use super::proxy_arp::DEFAULT_APP_ID as PROXY_ARP;
    pub use super::relay::DEFAULT_APP_ID as UNICAST_DHCP;
}
