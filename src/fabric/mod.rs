//! Controller-platform model
//!
//! Value types the apps exchange with the platform, the outbound
//! `NetworkActuator` boundary, and an in-memory actuator for replay.

mod actuator;
mod flow;
mod recorder;
mod types;

pub use actuator::{InboundPacket, NetworkActuator, PacketContext};
pub use flow::{Criterion, FlowRule, OutboundPacket, PacketPriority, PathIntent, TrafficSelector};
pub use recorder::{ActuatorCall, RecordingActuator};
pub use types::{ApplicationId, ConnectPoint, DeviceId, FilteredConnectPoint, PortNumber};
