//! Match fields and the outbound requests built from them

use super::{ApplicationId, ConnectPoint, DeviceId, FilteredConnectPoint, PortNumber};
use crate::protocol::MacAddr;
use std::fmt;
use std::time::Duration;

/// A single header match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    EthType(u16),
    EthSrc(MacAddr),
    EthDst(MacAddr),
    IpProtocol(u8),
    UdpSrc(u16),
    UdpDst(u16),
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::EthType(t) => write!(f, "ETH_TYPE:0x{:04x}", t),
            Criterion::EthSrc(mac) => write!(f, "ETH_SRC:{}", mac),
            Criterion::EthDst(mac) => write!(f, "ETH_DST:{}", mac),
            Criterion::IpProtocol(p) => write!(f, "IP_PROTO:{}", p),
            Criterion::UdpSrc(p) => write!(f, "UDP_SRC:{}", p),
            Criterion::UdpDst(p) => write!(f, "UDP_DST:{}", p),
        }
    }
}

/// Ordered set of header matches; empty matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TrafficSelector {
    criteria: Vec<Criterion>,
}

impl TrafficSelector {
    pub fn builder() -> Self {
        Self::default()
    }

    fn with(mut self, criterion: Criterion) -> Self {
        // A later match on the same field replaces the earlier one
        self.criteria
            .retain(|c| std::mem::discriminant(c) != std::mem::discriminant(&criterion));
        self.criteria.push(criterion);
        self
    }

    pub fn match_eth_type(self, ethertype: u16) -> Self {
        self.with(Criterion::EthType(ethertype))
    }

    pub fn match_eth_src(self, mac: MacAddr) -> Self {
        self.with(Criterion::EthSrc(mac))
    }

    pub fn match_eth_dst(self, mac: MacAddr) -> Self {
        self.with(Criterion::EthDst(mac))
    }

    pub fn match_ip_protocol(self, protocol: u8) -> Self {
        self.with(Criterion::IpProtocol(protocol))
    }

    pub fn match_udp_src(self, port: u16) -> Self {
        self.with(Criterion::UdpSrc(port))
    }

    pub fn match_udp_dst(self, port: u16) -> Self {
        self.with(Criterion::UdpDst(port))
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl fmt::Display for TrafficSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, criterion) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", criterion)?;
        }
        f.write_str("}")
    }
}

/// Priority of a packet-intercept request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketPriority {
    /// Reactive forwarding traffic
    Reactive,
}

impl PacketPriority {
    pub fn value(self) -> u16 {
        match self {
            PacketPriority::Reactive => 5,
        }
    }
}

/// A match/output entry installed on one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRule {
    pub device: DeviceId,
    pub selector: TrafficSelector,
    pub output: PortNumber,
    pub priority: u16,
    /// Soft (idle) timeout; `None` installs a permanent rule
    pub idle_timeout: Option<Duration>,
    pub app_id: ApplicationId,
}

/// Fabric-wide connectivity request between two filtered connect points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIntent {
    pub app_id: ApplicationId,
    pub selector: TrafficSelector,
    pub ingress: FilteredConnectPoint,
    pub egress: FilteredConnectPoint,
    pub priority: u16,
}

impl PathIntent {
    /// The same intent with ingress and egress swapped
    pub fn reversed(&self) -> Self {
        Self {
            app_id: self.app_id.clone(),
            selector: self.selector.clone(),
            ingress: self.egress.clone(),
            egress: self.ingress.clone(),
            priority: self.priority,
        }
    }
}

/// A raw frame to send out one port of a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    pub device: DeviceId,
    pub output: PortNumber,
    pub data: Vec<u8>,
}

impl OutboundPacket {
    pub fn new(point: &ConnectPoint, data: Vec<u8>) -> Self {
        Self {
            device: point.device.clone(),
            output: point.port,
            data,
        }
    }
}
