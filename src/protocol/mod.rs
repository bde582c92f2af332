//! Wire formats the apps inspect or synthesize
//!
//! Only what the decision engines need: Ethernet, ARP, IPv4 and UDP.

pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod types;
pub mod udp;

pub use types::*;
