//! Unicast DHCP relay controller
//!
//! Keeps one (ingress, egress) endpoint pair and, whenever an event
//! touches it while both ends are known, asks for a path reservation in
//! each direction between them.
//!
//! In static mode both ends come from network config. In reactive mode
//! the egress comes from config and the ingress is wherever the latest
//! DHCP packet was punted from.

use super::classifier::{classify, PacketClass};
use super::decision::{Decision, Dependency, DropReason};
use crate::fabric::{
    ApplicationId, ConnectPoint, FilteredConnectPoint, InboundPacket, PathIntent,
    TrafficSelector,
};
use crate::protocol::udp::{DHCP_CLIENT_PORT, DHCP_SERVER_PORT};
use crate::protocol::{ipv4, EtherType};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

pub const DEFAULT_APP_ID: &str = "nctu.winlab.unicastdhcp";
pub const DEFAULT_INTENT_PRIORITY: u16 = 50000;

/// Where the relay learns its client-side endpoint from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Both endpoints from configuration
    #[default]
    Static,
    /// Ingress from observed DHCP packets
    Reactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    /// Client side (`hostLocation`)
    Ingress,
    /// Server side (`serverLocation`)
    Egress,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRole::Ingress => f.write_str("ingress"),
            EndpointRole::Egress => f.write_str("egress"),
        }
    }
}

/// Input produced by the config translation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    EndpointUpdated(EndpointRole, ConnectPoint),
}

/// Current endpoints; either may still be unknown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointPair {
    pub ingress: Option<ConnectPoint>,
    pub egress: Option<ConnectPoint>,
}

impl EndpointPair {
    fn with(&self, role: EndpointRole, point: ConnectPoint) -> Self {
        let mut next = self.clone();
        match role {
            EndpointRole::Ingress => next.ingress = Some(point),
            EndpointRole::Egress => next.egress = Some(point),
        }
        next
    }

    pub fn get(&self, role: EndpointRole) -> Option<&ConnectPoint> {
        match role {
            EndpointRole::Ingress => self.ingress.as_ref(),
            EndpointRole::Egress => self.egress.as_ref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ingress.is_some() && self.egress.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub app_id: ApplicationId,
    pub mode: RelayMode,
    pub priority: u16,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            app_id: ApplicationId::new(DEFAULT_APP_ID),
            mode: RelayMode::Static,
            priority: DEFAULT_INTENT_PRIORITY,
        }
    }
}

/// Match used for punting DHCP client traffic to the controller
pub fn dhcp_selector() -> TrafficSelector {
    TrafficSelector::builder()
        .match_eth_type(EtherType::Ipv4 as u16)
        .match_ip_protocol(ipv4::Protocol::Udp as u8)
        .match_udp_src(DHCP_CLIENT_PORT)
        .match_udp_dst(DHCP_SERVER_PORT)
}

#[derive(Debug, Default)]
pub struct UnicastRelay {
    endpoints: ArcSwap<EndpointPair>,
    settings: RelaySettings,
}

impl UnicastRelay {
    pub fn new(settings: RelaySettings) -> Self {
        Self {
            endpoints: ArcSwap::from_pointee(EndpointPair::default()),
            settings,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn mode(&self) -> RelayMode {
        self.settings.mode
    }

    /// Snapshot of the current endpoints
    pub fn endpoints(&self) -> Arc<EndpointPair> {
        self.endpoints.load_full()
    }

    /// Match carried by both path reservations
    pub fn intent_selector(&self) -> TrafficSelector {
        match self.settings.mode {
            RelayMode::Static => dhcp_selector(),
            RelayMode::Reactive => TrafficSelector::builder()
                .match_eth_type(EtherType::Ipv4 as u16)
                .match_ip_protocol(ipv4::Protocol::Udp as u8),
        }
    }

    /// Apply a configuration-derived endpoint change
    pub fn on_event(&self, event: RelayEvent) -> Decision {
        let RelayEvent::EndpointUpdated(role, point) = event;
        if self.settings.mode == RelayMode::Reactive && role == EndpointRole::Ingress {
            debug!("relay: ignoring configured ingress {} in reactive mode", point);
            return Decision::Drop(DropReason::NotRelevant);
        }
        info!("relay: {} endpoint is {}", role, point);
        let snapshot = self.update(role, point);
        self.resync(&snapshot)
    }

    /// Handle a punted packet; only reactive mode learns from packets
    pub fn on_packet(&self, packet: &InboundPacket) -> Decision {
        match classify(&packet.data) {
            PacketClass::Ipv4Udp { .. } => {}
            PacketClass::NotParseable => return Decision::Drop(DropReason::NotParseable),
            PacketClass::Arp(_) => {
                trace!("relay: ignoring ARP from {}", packet.receiver);
                return Decision::Drop(DropReason::NotRelevant);
            }
            other => {
                trace!("relay: ignoring {:?} from {}", other, packet.receiver);
                return Decision::Drop(DropReason::NotRelevant);
            }
        }

        if self.settings.mode != RelayMode::Reactive {
            return Decision::Drop(DropReason::NotRelevant);
        }

        debug!("relay: DHCP client seen at {}", packet.receiver);
        let snapshot = self.update(EndpointRole::Ingress, packet.receiver.clone());
        self.resync(&snapshot)
    }

    /// Atomically replace one endpoint and return the pair this update produced
    fn update(&self, role: EndpointRole, point: ConnectPoint) -> EndpointPair {
        let previous = self.endpoints.rcu(|current| current.with(role, point.clone()));
        previous.with(role, point)
    }

    fn resync(&self, pair: &EndpointPair) -> Decision {
        let (ingress, egress) = match (&pair.ingress, &pair.egress) {
            (Some(ingress), Some(egress)) => (ingress, egress),
            (None, _) => {
                info!("relay: ingress endpoint unknown, waiting");
                return Decision::Drop(DropReason::MissingDependency(
                    Dependency::IngressEndpoint,
                ));
            }
            (_, None) => {
                info!("relay: egress endpoint unknown, waiting");
                return Decision::Drop(DropReason::MissingDependency(
                    Dependency::EgressEndpoint,
                ));
            }
        };

        let forward = PathIntent {
            app_id: self.settings.app_id.clone(),
            selector: self.intent_selector(),
            ingress: FilteredConnectPoint::new(ingress.clone()),
            egress: FilteredConnectPoint::new(egress.clone()),
            priority: self.settings.priority,
        };
        let reverse = forward.reversed();
        Decision::InstallPath { forward, reverse }
    }
}
