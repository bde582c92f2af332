//! Boundary between the decision engines and the controller platform

use super::{
    ApplicationId, ConnectPoint, FlowRule, OutboundPacket, PacketPriority, PathIntent,
    PortNumber, TrafficSelector,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Outbound operations offered by the controller platform
///
/// Every call is fire-and-forget: the platform owns delivery and the
/// engines never observe a result.
pub trait NetworkActuator: Send + Sync {
    /// Send a raw frame out one port of a device
    fn emit(&self, packet: OutboundPacket);

    /// Install a match/output rule on a single device
    fn install_flow_rule(&self, rule: FlowRule);

    /// Submit a fabric-wide path reservation
    fn submit_intent(&self, intent: PathIntent);

    /// Ask the platform to punt frames matching `selector` to this app
    fn request_packets(&self, selector: &TrafficSelector, priority: PacketPriority, app: &ApplicationId);

    /// Withdraw an earlier interception request
    fn cancel_packets(&self, selector: &TrafficSelector, priority: PacketPriority, app: &ApplicationId);
}

/// A frame punted to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    pub receiver: ConnectPoint,
    pub data: Vec<u8>,
}

impl InboundPacket {
    pub fn new(receiver: ConnectPoint, data: Vec<u8>) -> Self {
        Self { receiver, data }
    }
}

/// Packet-in event as handed to an app
///
/// Several apps may see the same context; once one of them sends the
/// packet it is marked handled and the rest leave it alone.
#[derive(Debug)]
pub struct PacketContext {
    inbound: InboundPacket,
    handled: AtomicBool,
}

impl PacketContext {
    pub fn new(inbound: InboundPacket) -> Self {
        Self {
            inbound,
            handled: AtomicBool::new(false),
        }
    }

    pub fn inbound(&self) -> &InboundPacket {
        &self.inbound
    }

    pub fn receiver(&self) -> &ConnectPoint {
        &self.inbound.receiver
    }

    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::Acquire)
    }

    /// Mark handled without sending anything
    pub fn block(&self) -> bool {
        !self.handled.swap(true, Ordering::AcqRel)
    }

    /// Emit the original frame out `port` of the receiving device
    ///
    /// Returns false (and sends nothing) if another handler got there first.
    pub fn send(&self, port: PortNumber, actuator: &dyn NetworkActuator) -> bool {
        if !self.block() {
            return false;
        }
        actuator.emit(OutboundPacket {
            device: self.inbound.receiver.device.clone(),
            output: port,
            data: self.inbound.data.clone(),
        });
        true
    }
}
