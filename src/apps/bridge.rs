//! Learning bridge app

use super::{admit, execute, App};
use crate::config::BridgeConfig;
use crate::dataplane::{LearningBridge, LearningTable};
use crate::fabric::{ApplicationId, NetworkActuator, PacketContext, PacketPriority, TrafficSelector};
use crate::protocol::EtherType;
use crate::telemetry::AppStats;
use std::sync::Arc;
use tracing::info;

pub struct BridgeApp {
    engine: LearningBridge,
    actuator: Arc<dyn NetworkActuator>,
    stats: AppStats,
}

impl BridgeApp {
    pub fn new(config: &BridgeConfig, actuator: Arc<dyn NetworkActuator>) -> Self {
        let engine = LearningBridge::new(LearningTable::new(config.max_age()), config.settings());
        Self {
            engine,
            actuator,
            stats: AppStats::new(),
        }
    }

    pub fn engine(&self) -> &LearningBridge {
        &self.engine
    }

    fn ipv4() -> TrafficSelector {
        TrafficSelector::builder().match_eth_type(EtherType::Ipv4 as u16)
    }

    fn ipv6() -> TrafficSelector {
        TrafficSelector::builder().match_eth_type(EtherType::Ipv6 as u16)
    }
}

impl App for BridgeApp {
    fn app_id(&self) -> &ApplicationId {
        &self.engine.settings().app_id
    }

    fn activate(&self) {
        self.actuator
            .request_packets(&Self::ipv4(), PacketPriority::Reactive, self.app_id());
        info!("{} started", self.app_id());
    }

    fn deactivate(&self) {
        let app = self.app_id();
        self.actuator
            .cancel_packets(&Self::ipv4(), PacketPriority::Reactive, app);
        // IPv6 too, in case an earlier activation asked for it
        self.actuator
            .cancel_packets(&Self::ipv6(), PacketPriority::Reactive, app);
        info!("{} stopped", app);
    }

    fn process(&self, context: &PacketContext) {
        if !admit(context, &self.stats) {
            return;
        }
        let decision = self.engine.decide(context.inbound());
        execute(decision, Some(context), self.actuator.as_ref(), &self.stats);
    }

    fn run_aging(&self) -> usize {
        self.engine.table().age_out()
    }

    fn stats(&self) -> &AppStats {
        &self.stats
    }
}
