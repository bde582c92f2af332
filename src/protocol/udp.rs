//! UDP protocol - RFC 768

use crate::{Error, Result};
use std::net::Ipv4Addr;

/// UDP header size (fixed)
pub const HEADER_SIZE: usize = 8;

/// UDP protocol number for pseudo-header
pub const PROTOCOL_NUMBER: u8 = 17;

/// DHCP server port (BOOTP server)
pub const DHCP_SERVER_PORT: u16 = 67;
/// DHCP client port (BOOTP client)
pub const DHCP_CLIENT_PORT: u16 = 68;

/// Returns true for either BOOTP/DHCP well-known port
pub fn is_dhcp_port(port: u16) -> bool {
    port == DHCP_SERVER_PORT || port == DHCP_CLIENT_PORT
}

/// Parsed UDP header (zero-copy reference)
#[derive(Debug)]
pub struct UdpHeader<'a> {
    buffer: &'a [u8],
}

impl<'a> UdpHeader<'a> {
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Parse("UDP header too short".into()));
        }

        Ok(Self { buffer })
    }

    pub fn src_port(&self) -> u16 {
        u16::from_be_bytes([self.buffer[0], self.buffer[1]])
    }

    pub fn dst_port(&self) -> u16 {
        u16::from_be_bytes([self.buffer[2], self.buffer[3]])
    }

    /// Length (header + data)
    pub fn length(&self) -> u16 {
        u16::from_be_bytes([self.buffer[4], self.buffer[5]])
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[HEADER_SIZE..]
    }
}

/// UDP datagram builder
#[derive(Debug, Clone, Default)]
pub struct UdpBuilder {
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
}

impl UdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn payload(mut self, data: &[u8]) -> Self {
        self.payload = data.to_vec();
        self
    }

    /// Build the datagram, checksummed against the given pseudo-header addresses
    pub fn build(self, src_ip: Ipv4Addr, dst_ip: Ipv4Addr) -> Vec<u8> {
        let length = (HEADER_SIZE + self.payload.len()) as u16;
        let mut buffer = vec![0u8; HEADER_SIZE + self.payload.len()];

        buffer[0..2].copy_from_slice(&self.src_port.to_be_bytes());
        buffer[2..4].copy_from_slice(&self.dst_port.to_be_bytes());
        buffer[4..6].copy_from_slice(&length.to_be_bytes());
        buffer[HEADER_SIZE..].copy_from_slice(&self.payload);

        let sum = udp_checksum(src_ip, dst_ip, &buffer);
        // 0 means "no checksum" on the wire
        let sum = if sum == 0 { 0xFFFF } else { sum };
        buffer[6..8].copy_from_slice(&sum.to_be_bytes());

        buffer
    }
}

/// Calculate UDP checksum with the IPv4 pseudo-header
pub fn udp_checksum(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, udp_datagram: &[u8]) -> u16 {
    let mut pseudo = Vec::with_capacity(12 + udp_datagram.len());
    pseudo.extend_from_slice(&src_ip.octets());
    pseudo.extend_from_slice(&dst_ip.octets());
    pseudo.push(0);
    pseudo.push(PROTOCOL_NUMBER);
    pseudo.extend_from_slice(&(udp_datagram.len() as u16).to_be_bytes());
    pseudo.extend_from_slice(udp_datagram);

    super::ipv4::checksum(&pseudo)
}
