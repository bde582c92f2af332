//! Ethernet II frame parsing and construction

use super::{EtherType, MacAddr};
use crate::{Error, Result};

/// Ethernet header size without VLAN tag
pub const HEADER_SIZE: usize = 14;
/// Size of one 802.1Q tag
const VLAN_TAG_SIZE: usize = 4;

/// Parsed Ethernet frame (zero-copy reference)
///
/// A single 802.1Q tag is skipped so that `ethertype()` and `payload()`
/// always describe the encapsulated protocol.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    buffer: &'a [u8],
    ethertype: u16,
    vlan_id: Option<u16>,
    payload_offset: usize,
}

impl<'a> Frame<'a> {
    /// Parse an Ethernet frame from a buffer
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Parse("frame too short".into()));
        }

        let outer = u16::from_be_bytes([buffer[12], buffer[13]]);
        if outer != EtherType::Vlan as u16 {
            return Ok(Self {
                buffer,
                ethertype: outer,
                vlan_id: None,
                payload_offset: HEADER_SIZE,
            });
        }

        if buffer.len() < HEADER_SIZE + VLAN_TAG_SIZE {
            return Err(Error::Parse("VLAN frame too short".into()));
        }
        let tci = u16::from_be_bytes([buffer[14], buffer[15]]);
        Ok(Self {
            buffer,
            ethertype: u16::from_be_bytes([buffer[16], buffer[17]]),
            vlan_id: Some(tci & 0x0FFF),
            payload_offset: HEADER_SIZE + VLAN_TAG_SIZE,
        })
    }

    pub fn dst_mac(&self) -> MacAddr {
        mac_at(self.buffer, 0)
    }

    pub fn src_mac(&self) -> MacAddr {
        mac_at(self.buffer, 6)
    }

    pub fn ethertype(&self) -> u16 {
        self.ethertype
    }

    pub fn vlan_id(&self) -> Option<u16> {
        self.vlan_id
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[self.payload_offset..]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }
}

fn mac_at(buffer: &[u8], offset: usize) -> MacAddr {
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&buffer[offset..offset + 6]);
    MacAddr(mac)
}

/// Builder for constructing untagged Ethernet frames
#[derive(Debug, Default)]
pub struct FrameBuilder {
    dst_mac: MacAddr,
    src_mac: MacAddr,
    ethertype: u16,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dst_mac(mut self, mac: MacAddr) -> Self {
        self.dst_mac = mac;
        self
    }

    pub fn src_mac(mut self, mac: MacAddr) -> Self {
        self.src_mac = mac;
        self
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buffer.extend_from_slice(&self.dst_mac.0);
        buffer.extend_from_slice(&self.src_mac.0);
        buffer.extend_from_slice(&self.ethertype.to_be_bytes());
        buffer.extend_from_slice(&self.payload);
        buffer
    }
}
