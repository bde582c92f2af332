//! MAC-learning forwarder
//!
//! Learns where each source MAC lives per device. A frame to a known
//! destination installs a directional `{eth_src, eth_dst} -> port` rule
//! and is sent out that port; anything else floods.

use super::decision::{Decision, DropReason};
use super::tables::LearningTable;
use crate::fabric::{ApplicationId, FlowRule, InboundPacket, TrafficSelector};
use crate::protocol::ethernet::Frame;
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_APP_ID: &str = "nctu.winlab.bridge";
pub const DEFAULT_FLOW_PRIORITY: u16 = 30;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters of the rules the bridge installs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub app_id: ApplicationId,
    pub priority: u16,
    pub idle_timeout: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            app_id: ApplicationId::new(DEFAULT_APP_ID),
            priority: DEFAULT_FLOW_PRIORITY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
pub struct LearningBridge {
    table: LearningTable,
    settings: BridgeSettings,
}

impl LearningBridge {
    pub fn new(table: LearningTable, settings: BridgeSettings) -> Self {
        Self { table, settings }
    }

    pub fn table(&self) -> &LearningTable {
        &self.table
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Learn from one punted frame and decide where it goes
    pub fn decide(&self, packet: &InboundPacket) -> Decision {
        let frame = match Frame::parse(&packet.data) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("bridge: dropping frame from {}: {}", packet.receiver, e);
                return Decision::Drop(DropReason::NotParseable);
            }
        };

        let device = &packet.receiver.device;
        let src = frame.src_mac();
        let dst = frame.dst_mac();

        match self.table.learn(device, src, packet.receiver.port) {
            Some(old) if old != packet.receiver.port => {
                debug!("{} moved on {}: port {} -> {}", src, device, old, packet.receiver.port)
            }
            Some(_) => {}
            None => debug!("learned {} at {}", src, packet.receiver),
        }

        match self.table.lookup(device, &dst) {
            Some(out_port) => {
                let rule = FlowRule {
                    device: device.clone(),
                    selector: TrafficSelector::builder()
                        .match_eth_src(src)
                        .match_eth_dst(dst),
                    output: out_port,
                    priority: self.settings.priority,
                    idle_timeout: Some(self.settings.idle_timeout),
                    app_id: self.settings.app_id.clone(),
                };
                Decision::ForwardAndInstall { out_port, rule }
            }
            None => {
                trace!("{} unknown on {}, flooding", dst, device);
                Decision::Flood
            }
        }
    }
}
