//! Replay traces
//!
//! A trace is a TOML file with one `[[event]]` table per platform event:
//!
//! ```toml
//! [[event]]
//! kind = "config"
//! class = "dhcp"
//! record = { serverLocation = "of:0000000000000004/1" }
//!
//! [[event]]
//! kind = "packet"
//! at = "of:0000000000000001/2"
//! frame = { type = "dhcp", client_mac = "00:00:00:00:00:01" }
//! ```
//!
//! Frames are described by their fields and built on load.

use super::dispatcher::PlatformEvent;
use crate::config::{ConfigClass, NetworkConfigStore};
use crate::fabric::{ConnectPoint, InboundPacket};
use crate::protocol::arp::ArpPacket;
use crate::protocol::ethernet::FrameBuilder;
use crate::protocol::ipv4::{self, Ipv4Builder};
use crate::protocol::udp::{UdpBuilder, DHCP_CLIENT_PORT, DHCP_SERVER_PORT};
use crate::protocol::{EtherType, MacAddr};
use crate::{Error, Result};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::Path;

/// Fixed part of a BOOTP message
const BOOTP_FIXED_LEN: usize = 236;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Trace {
    #[serde(rename = "event", default)]
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A frame punted from `at`
    Packet { at: ConnectPoint, frame: TraceFrame },
    /// A network-config record added or replaced
    Config { class: RecordClass, record: toml::Value },
    /// A network-config record withdrawn
    Remove { class: RecordClass },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordClass {
    Host,
    Dhcp,
}

impl From<RecordClass> for ConfigClass {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::Host => ConfigClass::Host,
            RecordClass::Dhcp => ConfigClass::Dhcp,
        }
    }
}

fn default_ethertype() -> u16 {
    EtherType::Ipv4 as u16
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceFrame {
    /// Bare Ethernet header plus zeroed payload
    Ethernet {
        src: MacAddr,
        dst: MacAddr,
        #[serde(default = "default_ethertype")]
        ethertype: u16,
        #[serde(default)]
        payload_len: usize,
    },
    ArpRequest {
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_ip: Ipv4Addr,
    },
    ArpReply {
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    },
    /// Broadcast DHCP message; client to server unless `from_server`
    Dhcp {
        client_mac: MacAddr,
        #[serde(default)]
        from_server: bool,
    },
}

impl TraceFrame {
    pub fn build(&self) -> Vec<u8> {
        match self {
            TraceFrame::Ethernet {
                src,
                dst,
                ethertype,
                payload_len,
            } => FrameBuilder::new()
                .src_mac(*src)
                .dst_mac(*dst)
                .ethertype(*ethertype)
                .payload(&vec![0u8; *payload_len])
                .build(),
            TraceFrame::ArpRequest {
                sender_mac,
                sender_ip,
                target_ip,
            } => ArpPacket::request(*sender_mac, *sender_ip, *target_ip).to_frame(),
            TraceFrame::ArpReply {
                sender_mac,
                sender_ip,
                target_mac,
                target_ip,
            } => ArpPacket::reply(*sender_mac, *sender_ip, *target_mac, *target_ip).to_frame(),
            TraceFrame::Dhcp {
                client_mac,
                from_server,
            } => dhcp_frame(*client_mac, *from_server),
        }
    }
}

fn dhcp_frame(client_mac: MacAddr, from_server: bool) -> Vec<u8> {
    let (src_port, dst_port) = if from_server {
        (DHCP_SERVER_PORT, DHCP_CLIENT_PORT)
    } else {
        (DHCP_CLIENT_PORT, DHCP_SERVER_PORT)
    };

    let mut bootp = vec![0u8; BOOTP_FIXED_LEN];
    // op, htype, hlen
    bootp[0] = if from_server { 2 } else { 1 };
    bootp[1] = 1;
    bootp[2] = 6;
    bootp[28..34].copy_from_slice(&client_mac.0);

    let udp = UdpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .payload(&bootp)
        .build(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST);
    let ip = Ipv4Builder::new()
        .protocol(ipv4::Protocol::Udp as u8)
        .src_addr(Ipv4Addr::UNSPECIFIED)
        .dst_addr(Ipv4Addr::BROADCAST)
        .payload(&udp)
        .build();
    FrameBuilder::new()
        .dst_mac(MacAddr::BROADCAST)
        .src_mac(client_mac)
        .ethertype(EtherType::Ipv4 as u16)
        .payload(&ip)
        .build()
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Trace> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<Trace> {
    toml::from_str(content).map_err(|e| Error::Parse(format!("trace: {}", e)))
}

impl Trace {
    /// Turn the trace into platform events
    ///
    /// Config records are written to `store` as they are reached, which
    /// is what produces their added/updated/removed events.
    pub fn into_events(self, store: &NetworkConfigStore) -> Result<Vec<PlatformEvent>> {
        self.events
            .into_iter()
            .map(|event| {
                Ok(match event {
                    TraceEvent::Packet { at, frame } => {
                        PlatformEvent::Packet(InboundPacket::new(at, frame.build()))
                    }
                    TraceEvent::Config { class, record } => {
                        PlatformEvent::Config(store.apply(class.into(), record)?)
                    }
                    TraceEvent::Remove { class } => {
                        PlatformEvent::Config(store.remove(class.into()))
                    }
                })
            })
            .collect()
    }
}
