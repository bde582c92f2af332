//! Identifiers for network elements and attachment points

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a switch, e.g. `of:0000000000000001`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Device-local port number, including the reserved logical ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct PortNumber(u64);

impl PortNumber {
    /// Send back out the ingress port
    pub const IN_PORT: PortNumber = PortNumber(0xffff_fff8);
    /// Every port except the ingress port
    pub const FLOOD: PortNumber = PortNumber(0xffff_fffb);
    /// Every port including the ingress port
    pub const ALL: PortNumber = PortNumber(0xffff_fffc);
    /// Punt to the controller
    pub const CONTROLLER: PortNumber = PortNumber(0xffff_fffd);
    /// The switch's local networking stack
    pub const LOCAL: PortNumber = PortNumber(0xffff_fffe);

    const LOGICAL: [(PortNumber, &'static str); 5] = [
        (Self::IN_PORT, "IN_PORT"),
        (Self::FLOOD, "FLOOD"),
        (Self::ALL, "ALL"),
        (Self::CONTROLLER, "CONTROLLER"),
        (Self::LOCAL, "LOCAL"),
    ];

    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }

    pub fn is_logical(self) -> bool {
        Self::LOGICAL.iter().any(|(port, _)| *port == self)
    }
}

impl From<u64> for PortNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::LOGICAL.iter().find(|(port, _)| port == self) {
            Some((_, name)) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for PortNumber {
    type Err = Error;

    /// Accepts a decimal port number or a logical port name
    fn from_str(s: &str) -> Result<Self> {
        if let Some((port, _)) = Self::LOGICAL
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
        {
            return Ok(*port);
        }
        s.parse::<u64>()
            .map(PortNumber)
            .map_err(|_| Error::Parse(format!("invalid port number `{}`", s)))
    }
}

impl TryFrom<String> for PortNumber {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A (device, port) attachment point
///
/// The textual form is `"<device>/<port>"`, the encoding used by the
/// network-config records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct ConnectPoint {
    pub device: DeviceId,
    pub port: PortNumber,
}

impl ConnectPoint {
    pub fn new(device: impl Into<DeviceId>, port: impl Into<PortNumber>) -> Self {
        Self {
            device: device.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}

impl FromStr for ConnectPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidConnectPoint {
            token: s.to_string(),
            reason: reason.to_string(),
        };

        let (device, port) = s
            .split_once('/')
            .ok_or_else(|| invalid("expected `<device>/<port>`"))?;
        if device.is_empty() {
            return Err(invalid("empty device id"));
        }
        if port.is_empty() {
            return Err(invalid("empty port"));
        }
        let port: PortNumber = port.parse().map_err(|_| invalid("bad port number"))?;

        Ok(Self::new(DeviceId::new(device), port))
    }
}

impl TryFrom<String> for ConnectPoint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A connect point plus the traffic filter it accepts
///
/// The filter is implicit (match everything) for every endpoint these
/// apps build; the field exists so intents keep the platform's shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilteredConnectPoint {
    pub connect_point: ConnectPoint,
    pub filter: super::TrafficSelector,
}

impl FilteredConnectPoint {
    pub fn new(connect_point: ConnectPoint) -> Self {
        Self {
            connect_point,
            filter: super::TrafficSelector::default(),
        }
    }
}

impl fmt::Display for FilteredConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.connect_point, f)
    }
}

/// Owning application of rules, intents and intercepts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
