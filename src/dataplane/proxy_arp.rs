//! Proxy ARP resolver
//!
//! Learns IPv4 to MAC bindings from every ARP packet and answers
//! requests for known addresses directly out the ingress point. Unknown
//! targets are flooded so the owner can answer.
//!
//! Replies only feed the table unless reply forwarding is enabled. With
//! it on, each flooded request leaves a short-lived record of where the
//! requester sits, and a reply addressed to that requester is sent there
//! once.

use super::classifier::{classify, PacketClass};
use super::decision::{Decision, Dependency, DropReason};
use super::tables::{ArpTable, ConnectPointCache};
use crate::fabric::{ApplicationId, InboundPacket};
use crate::protocol::arp::{ArpOp, ArpPacket};
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_APP_ID: &str = "nctu.winlab.ProxyArp";
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyArpSettings {
    pub app_id: ApplicationId,
    /// Unicast replies back to a flooded requester
    pub reply_forwarding: bool,
    /// How long a flooded request waits for its reply
    pub pending_ttl: Duration,
}

impl Default for ProxyArpSettings {
    fn default() -> Self {
        Self {
            app_id: ApplicationId::new(DEFAULT_APP_ID),
            reply_forwarding: false,
            pending_ttl: DEFAULT_PENDING_TTL,
        }
    }
}

#[derive(Debug)]
pub struct ProxyArp {
    arp_table: ArpTable,
    pending: ConnectPointCache,
    settings: ProxyArpSettings,
}

impl Default for ProxyArp {
    fn default() -> Self {
        Self::new(ArpTable::default(), ProxyArpSettings::default())
    }
}

impl ProxyArp {
    pub fn new(arp_table: ArpTable, settings: ProxyArpSettings) -> Self {
        Self {
            arp_table,
            pending: ConnectPointCache::new(Some(settings.pending_ttl)),
            settings,
        }
    }

    pub fn arp_table(&self) -> &ArpTable {
        &self.arp_table
    }

    pub fn pending(&self) -> &ConnectPointCache {
        &self.pending
    }

    pub fn settings(&self) -> &ProxyArpSettings {
        &self.settings
    }

    pub fn decide(&self, packet: &InboundPacket) -> Decision {
        let arp = match classify(&packet.data) {
            PacketClass::Arp(arp) => arp,
            PacketClass::NotParseable => return Decision::Drop(DropReason::NotParseable),
            other => {
                trace!("proxy-arp: ignoring non-ARP frame {:?}", other);
                return Decision::Drop(DropReason::NotRelevant);
            }
        };

        if self.arp_table.put(arp.sender_ip, arp.sender_mac).is_none() {
            debug!("arp: learned {} is-at {}", arp.sender_ip, arp.sender_mac);
        }

        match arp.operation {
            ArpOp::Request => self.on_request(&arp, packet),
            ArpOp::Reply => self.on_reply(&arp, packet),
        }
    }

    fn on_request(&self, arp: &ArpPacket, packet: &InboundPacket) -> Decision {
        match self.arp_table.get(&arp.target_ip) {
            Some(mac) => {
                debug!(
                    "arp: answering who-has {} for {} at {}",
                    arp.target_ip, arp.sender_ip, packet.receiver
                );
                let reply = arp.answer(arp.target_ip, mac);
                Decision::EmitSynthesized {
                    frame: reply.to_frame(),
                    to: packet.receiver.clone(),
                }
            }
            None => {
                if self.settings.reply_forwarding {
                    self.pending.put(arp.sender_ip, packet.receiver.clone());
                }
                trace!("arp: {} unknown, flooding request", arp.target_ip);
                Decision::Flood
            }
        }
    }

    fn on_reply(&self, arp: &ArpPacket, packet: &InboundPacket) -> Decision {
        if !self.settings.reply_forwarding {
            return Decision::Drop(DropReason::MissingDependency(
                Dependency::RequesterLocation,
            ));
        }
        match self.pending.take(&arp.target_ip) {
            Some(requester) => {
                debug!(
                    "arp: returning reply for {} from {} to {}",
                    arp.sender_ip, packet.receiver, requester
                );
                Decision::Redirect { to: requester }
            }
            None => Decision::Drop(DropReason::MissingDependency(
                Dependency::RequesterLocation,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::ConnectPoint;
    use crate::protocol::ethernet::Frame;
    use crate::protocol::MacAddr;
    use std::net::Ipv4Addr;

    const MAC_A: MacAddr = MacAddr([0x00, 0x00, 0x00, 0x00, 0x00, 0x0a]);
    const MAC_B: MacAddr = MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x0b]);
    const IP_A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const IP_B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    fn arp_in(device: &str, port: u64, arp: &ArpPacket) -> InboundPacket {
        InboundPacket::new(ConnectPoint::new(device, port), arp.to_frame())
    }

    fn forwarding() -> ProxyArp {
        ProxyArp::new(
            ArpTable::default(),
            ProxyArpSettings {
                reply_forwarding: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_request_for_unknown_floods() {
        let proxy = ProxyArp::default();

        let decision = proxy.decide(&arp_in("s1", 1, &ArpPacket::request(MAC_A, IP_A, IP_B)));
        assert_eq!(decision, Decision::Flood);
        assert_eq!(proxy.arp_table().get(&IP_A), Some(MAC_A));
        assert_eq!(proxy.arp_table().get(&IP_B), None);
        assert_eq!(proxy.arp_table().len(), 1);
        // Reply forwarding is off by default
        assert!(proxy.pending().is_empty());
    }

    #[test]
    fn test_request_for_known_is_answered() {
        let proxy = ProxyArp::default();
        proxy.decide(&arp_in("s2", 4, &ArpPacket::request(MAC_B, IP_B, IP_A)));

        let decision = proxy.decide(&arp_in("s1", 1, &ArpPacket::request(MAC_A, IP_A, IP_B)));
        match decision {
            Decision::EmitSynthesized { frame, to } => {
                assert_eq!(to, ConnectPoint::new("s1", 1));
                let eth = Frame::parse(&frame).unwrap();
                assert_eq!(eth.src_mac(), MAC_B);
                assert_eq!(eth.dst_mac(), MAC_A);
                let reply = ArpPacket::parse(eth.payload()).unwrap();
                assert_eq!(reply.operation, ArpOp::Reply);
                assert_eq!((reply.sender_ip, reply.sender_mac), (IP_B, MAC_B));
                assert_eq!((reply.target_ip, reply.target_mac), (IP_A, MAC_A));
            }
            other => panic!("Expected EmitSynthesized, got {:?}", other),
        }
    }

    #[test]
    fn test_reply_only_learns_by_default() {
        let proxy = ProxyArp::default();
        let reply = ArpPacket::reply(MAC_B, IP_B, MAC_A, IP_A);

        let decision = proxy.decide(&arp_in("s2", 4, &reply));
        assert_eq!(
            decision,
            Decision::Drop(DropReason::MissingDependency(Dependency::RequesterLocation))
        );
        assert_eq!(proxy.arp_table().get(&IP_B), Some(MAC_B));
    }

    #[test]
    fn test_non_arp_is_ignored_without_learning() {
        let proxy = ProxyArp::default();
        let frame = crate::protocol::ethernet::FrameBuilder::new()
            .src_mac(MAC_A)
            .ethertype(0x0800)
            .payload(&[0u8; 20])
            .build();

        let decision = proxy.decide(&InboundPacket::new(ConnectPoint::new("s1", 1), frame));
        assert_eq!(decision, Decision::Drop(DropReason::NotRelevant));
        assert!(proxy.arp_table().is_empty());

        let short = InboundPacket::new(ConnectPoint::new("s1", 1), vec![0u8; 3]);
        assert_eq!(proxy.decide(&short), Decision::Drop(DropReason::NotParseable));
    }

    #[test]
    fn test_latest_binding_wins() {
        let proxy = ProxyArp::default();
        let moved = MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        proxy.decide(&arp_in("s2", 4, &ArpPacket::request(MAC_B, IP_B, IP_A)));
        proxy.decide(&arp_in("s3", 1, &ArpPacket::request(moved, IP_B, IP_A)));

        assert_eq!(proxy.arp_table().get(&IP_B), Some(moved));
    }

    #[test]
    fn test_reply_forwarded_to_requester() {
        let proxy = forwarding();
        let request = ArpPacket::request(MAC_A, IP_A, IP_B);
        assert_eq!(proxy.decide(&arp_in("s1", 1, &request)), Decision::Flood);
        assert_eq!(proxy.pending().get(&IP_A), Some(ConnectPoint::new("s1", 1)));

        let reply = ArpPacket::reply(MAC_B, IP_B, MAC_A, IP_A);
        let inbound = arp_in("s2", 4, &reply);
        assert_eq!(
            proxy.decide(&inbound),
            Decision::Redirect {
                to: ConnectPoint::new("s1", 1)
            }
        );

        // The pending record is consumed
        assert!(proxy.pending().is_empty());
        assert!(proxy.decide(&inbound).is_drop());
    }

    #[test]
    fn test_expired_request_is_not_forwarded() {
        let proxy = ProxyArp::new(
            ArpTable::default(),
            ProxyArpSettings {
                reply_forwarding: true,
                pending_ttl: Duration::ZERO,
                ..Default::default()
            },
        );
        proxy.decide(&arp_in("s1", 1, &ArpPacket::request(MAC_A, IP_A, IP_B)));

        let reply = ArpPacket::reply(MAC_B, IP_B, MAC_A, IP_A);
        assert!(proxy.decide(&arp_in("s2", 4, &reply)).is_drop());
    }
}
