//! Switchboard - reactive SDN controller apps
//!
//! A MAC-learning bridge, a proxy ARP responder and a unicast DHCP relay,
//! written against a small model of a controller's packet, flow and
//! intent services.

pub mod apps;
pub mod config;
pub mod dataplane;
pub mod error;
pub mod fabric;
pub mod platform;
pub mod protocol;
pub mod telemetry;

pub use error::{Error, Result};
