//! Packet classification
//!
//! Turns a raw punted frame into the one event type the decision engines
//! switch on.

use crate::protocol::arp::ArpPacket;
use crate::protocol::ethernet::Frame;
use crate::protocol::ipv4::{self, Ipv4Header};
use crate::protocol::udp::{self, UdpHeader};
use crate::protocol::EtherType;
use tracing::trace;

/// Typed view of an inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketClass<'a> {
    /// Link layer or the recognised upper layer failed to parse
    NotParseable,
    Arp(ArpPacket),
    /// DHCP/BOOTP over UDP
    Ipv4Udp {
        src_port: u16,
        dst_port: u16,
        payload: &'a [u8],
    },
    /// Any EtherType without a dedicated class, by raw value
    EtherType(u16),
    /// IPv4 that is not DHCP
    NotRelevant,
}

/// Classify a raw frame
pub fn classify(data: &[u8]) -> PacketClass<'_> {
    match Frame::parse(data) {
        Ok(frame) => classify_frame(&frame),
        Err(e) => {
            trace!("unparseable frame ({} bytes): {}", data.len(), e);
            PacketClass::NotParseable
        }
    }
}

/// Classify an already parsed Ethernet frame
pub fn classify_frame<'a>(frame: &Frame<'a>) -> PacketClass<'a> {
    match EtherType::from_u16(frame.ethertype()) {
        Some(EtherType::Arp) => match ArpPacket::parse(frame.payload()) {
            Ok(arp) => PacketClass::Arp(arp),
            Err(e) => {
                trace!("bad ARP payload: {}", e);
                PacketClass::NotParseable
            }
        },
        Some(EtherType::Ipv4) => classify_ipv4(frame.payload()),
        _ => PacketClass::EtherType(frame.ethertype()),
    }
}

fn classify_ipv4(data: &[u8]) -> PacketClass<'_> {
    let ip = match Ipv4Header::parse(data) {
        Ok(ip) => ip,
        Err(e) => {
            trace!("bad IPv4 header: {}", e);
            return PacketClass::NotParseable;
        }
    };

    if ip.protocol() != ipv4::Protocol::Udp as u8 {
        return PacketClass::NotRelevant;
    }

    let udp = match UdpHeader::parse(ip.payload()) {
        Ok(udp) => udp,
        Err(e) => {
            trace!("bad UDP header: {}", e);
            return PacketClass::NotParseable;
        }
    };

    if udp::is_dhcp_port(udp.src_port()) && udp::is_dhcp_port(udp.dst_port()) {
        PacketClass::Ipv4Udp {
            src_port: udp.src_port(),
            dst_port: udp.dst_port(),
            payload: udp.payload(),
        }
    } else {
        PacketClass::NotRelevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ethernet::FrameBuilder;
    use crate::protocol::ipv4::Ipv4Builder;
    use crate::protocol::udp::UdpBuilder;
    use crate::protocol::MacAddr;
    use std::net::Ipv4Addr;

    const CLIENT: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn ipv4_frame(protocol: u8, payload: &[u8]) -> Vec<u8> {
        let ip = Ipv4Builder::new()
            .protocol(protocol)
            .src_addr(Ipv4Addr::UNSPECIFIED)
            .dst_addr(Ipv4Addr::BROADCAST)
            .payload(payload)
            .build();
        FrameBuilder::new()
            .dst_mac(MacAddr::BROADCAST)
            .src_mac(CLIENT)
            .ethertype(EtherType::Ipv4 as u16)
            .payload(&ip)
            .build()
    }

    fn udp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
        let udp = UdpBuilder::new()
            .src_port(src_port)
            .dst_port(dst_port)
            .payload(b"dhcp")
            .build(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST);
        ipv4_frame(ipv4::Protocol::Udp as u8, &udp)
    }

    #[test]
    fn test_classify_short_frame() {
        assert_eq!(classify(&[0u8; 10]), PacketClass::NotParseable);
    }

    #[test]
    fn test_classify_arp() {
        let arp = ArpPacket::request(CLIENT, Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2));
        match classify(&arp.to_frame()) {
            PacketClass::Arp(parsed) => assert_eq!(parsed, arp),
            other => panic!("Expected Arp class, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_truncated_arp() {
        let frame = FrameBuilder::new()
            .ethertype(EtherType::Arp as u16)
            .payload(&[0u8; 10])
            .build();
        assert_eq!(classify(&frame), PacketClass::NotParseable);
    }

    #[test]
    fn test_classify_dhcp() {
        let frame = udp_frame(68, 67);
        match classify(&frame) {
            PacketClass::Ipv4Udp {
                src_port,
                dst_port,
                payload,
            } => {
                assert_eq!(src_port, 68);
                assert_eq!(dst_port, 67);
                assert_eq!(payload, b"dhcp");
            }
            other => panic!("Expected Ipv4Udp class, got {:?}", other),
        }
        // Server to client direction is DHCP too
        assert!(matches!(classify(&udp_frame(67, 68)), PacketClass::Ipv4Udp { .. }));
    }

    #[test]
    fn test_classify_non_dhcp_ipv4() {
        assert_eq!(classify(&udp_frame(5353, 53)), PacketClass::NotRelevant);
        assert_eq!(classify(&udp_frame(68, 53)), PacketClass::NotRelevant);
        assert_eq!(
            classify(&ipv4_frame(ipv4::Protocol::Tcp as u8, &[0u8; 20])),
            PacketClass::NotRelevant
        );
    }

    #[test]
    fn test_classify_truncated_udp() {
        let frame = ipv4_frame(ipv4::Protocol::Udp as u8, &[0u8; 4]);
        assert_eq!(classify(&frame), PacketClass::NotParseable);
    }

    #[test]
    fn test_classify_other_ethertype() {
        let frame = FrameBuilder::new()
            .ethertype(EtherType::Ipv6 as u16)
            .payload(&[0u8; 40])
            .build();
        assert_eq!(classify(&frame), PacketClass::EtherType(0x86DD));

        let lldp = FrameBuilder::new().ethertype(0x88CC).build();
        assert_eq!(classify(&lldp), PacketClass::EtherType(0x88CC));
    }
}
