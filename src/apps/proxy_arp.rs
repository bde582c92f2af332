//! Proxy ARP app

use super::{admit, execute, App};
use crate::config::ProxyArpConfig;
use crate::dataplane::{ArpTable, Decision, ProxyArp};
use crate::fabric::{ApplicationId, NetworkActuator, PacketContext, PacketPriority, TrafficSelector};
use crate::protocol::EtherType;
use crate::telemetry::AppStats;
use std::sync::Arc;
use tracing::info;

pub struct ProxyArpApp {
    engine: ProxyArp,
    actuator: Arc<dyn NetworkActuator>,
    stats: AppStats,
}

impl ProxyArpApp {
    pub fn new(config: &ProxyArpConfig, actuator: Arc<dyn NetworkActuator>) -> Self {
        let engine = ProxyArp::new(ArpTable::new(config.max_age()), config.settings());
        Self {
            engine,
            actuator,
            stats: AppStats::new(),
        }
    }

    pub fn engine(&self) -> &ProxyArp {
        &self.engine
    }

    fn arp() -> TrafficSelector {
        TrafficSelector::builder().match_eth_type(EtherType::Arp as u16)
    }
}

impl App for ProxyArpApp {
    fn app_id(&self) -> &ApplicationId {
        &self.engine.settings().app_id
    }

    fn activate(&self) {
        self.actuator
            .request_packets(&Self::arp(), PacketPriority::Reactive, self.app_id());
        info!("{} started", self.app_id());
    }

    fn deactivate(&self) {
        self.actuator
            .cancel_packets(&Self::arp(), PacketPriority::Reactive, self.app_id());
        info!("{} stopped", self.app_id());
    }

    fn process(&self, context: &PacketContext) {
        if !admit(context, &self.stats) {
            return;
        }
        let decision = self.engine.decide(context.inbound());
        if matches!(decision, Decision::EmitSynthesized { .. }) {
            self.stats.arp_replies.inc();
        }
        execute(decision, Some(context), self.actuator.as_ref(), &self.stats);
    }

    fn run_aging(&self) -> usize {
        self.engine.arp_table().age_out() + self.engine.pending().age_out()
    }

    fn stats(&self) -> &AppStats {
        &self.stats
    }
}
