//! App-level tests
//!
//! Each app is driven through its `App` entry points against a
//! recording actuator, the way the controller would drive it.
//!
//! Run with: cargo test --test apps

mod bridge;
mod proxy_arp;
mod replay;
mod unicast_dhcp;

use switchboard::fabric::{ConnectPoint, InboundPacket, PacketContext};
use switchboard::protocol::ethernet::FrameBuilder;
use switchboard::protocol::MacAddr;

pub fn mac(last: u8) -> MacAddr {
    MacAddr([0x00, 0x00, 0x00, 0x00, 0x00, last])
}

pub fn packet_in(device: &str, port: u64, data: Vec<u8>) -> PacketContext {
    PacketContext::new(InboundPacket::new(ConnectPoint::new(device, port), data))
}

pub fn ethernet(src: MacAddr, dst: MacAddr) -> Vec<u8> {
    FrameBuilder::new()
        .src_mac(src)
        .dst_mac(dst)
        .ethertype(0x0800)
        .payload(&[0u8; 46])
        .build()
}
