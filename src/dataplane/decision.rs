//! Forwarding decisions produced by the engines

use crate::fabric::{ConnectPoint, FlowRule, PathIntent, PortNumber};
use std::fmt;

/// Why an event produced no action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The frame failed to parse
    NotParseable,
    /// Wrong EtherType or protocol for this engine
    NotRelevant,
    /// Waiting on configuration or an endpoint
    MissingDependency(Dependency),
    /// Another handler already dealt with the packet
    AlreadyHandled,
}

/// Inputs a decision can be waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Configuration,
    IngressEndpoint,
    EgressEndpoint,
    /// Where the request an ARP reply answers came from
    RequesterLocation,
}

impl DropReason {
    /// Short label, used for per-reason counters
    pub fn label(self) -> &'static str {
        match self {
            DropReason::NotParseable => "not_parseable",
            DropReason::NotRelevant => "not_relevant",
            DropReason::MissingDependency(_) => "missing_dependency",
            DropReason::AlreadyHandled => "already_handled",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingDependency(dep) => write!(f, "missing {:?}", dep),
            other => f.write_str(other.label()),
        }
    }
}

/// What to do with one event; consumed immediately, never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send the packet out every port except the ingress
    Flood,
    /// Install `rule` and send the packet out `out_port`
    ForwardAndInstall { out_port: PortNumber, rule: FlowRule },
    /// Submit both directions of a path reservation
    InstallPath {
        forward: PathIntent,
        reverse: PathIntent,
    },
    /// Send a frame built by the engine instead of the received one
    EmitSynthesized { frame: Vec<u8>, to: ConnectPoint },
    /// Send the received frame out `to`, which may be on another device
    Redirect { to: ConnectPoint },
    Drop(DropReason),
}

impl Decision {
    pub fn is_drop(&self) -> bool {
        matches!(self, Decision::Drop(_))
    }
}
