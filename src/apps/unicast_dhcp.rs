//! Unicast DHCP relay app
//!
//! Listens for `HostConfig`/`UnicastDhcpConfig` records and, in reactive
//! mode, for DHCP client packets.

use super::{admit, execute, App};
use crate::config::{translate, ConfigProvider, NetworkConfigEvent, UnicastDhcpConfig};
use crate::dataplane::{dhcp_selector, RelayMode, UnicastRelay};
use crate::fabric::{ApplicationId, NetworkActuator, PacketContext, PacketPriority};
use crate::telemetry::AppStats;
use std::sync::Arc;
use tracing::info;

pub struct UnicastDhcpApp {
    engine: UnicastRelay,
    actuator: Arc<dyn NetworkActuator>,
    provider: Arc<dyn ConfigProvider>,
    stats: AppStats,
}

impl UnicastDhcpApp {
    pub fn new(
        config: &UnicastDhcpConfig,
        actuator: Arc<dyn NetworkActuator>,
        provider: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            engine: UnicastRelay::new(config.settings()),
            actuator,
            provider,
            stats: AppStats::new(),
        }
    }

    pub fn engine(&self) -> &UnicastRelay {
        &self.engine
    }

    fn intercepts(&self) -> bool {
        self.engine.mode() == RelayMode::Reactive
    }
}

impl App for UnicastDhcpApp {
    fn app_id(&self) -> &ApplicationId {
        &self.engine.settings().app_id
    }

    fn activate(&self) {
        if self.intercepts() {
            self.actuator
                .request_packets(&dhcp_selector(), PacketPriority::Reactive, self.app_id());
        }
        info!("{} started in {:?} mode", self.app_id(), self.engine.mode());
    }

    fn deactivate(&self) {
        if self.intercepts() {
            self.actuator
                .cancel_packets(&dhcp_selector(), PacketPriority::Reactive, self.app_id());
        }
        info!("{} stopped", self.app_id());
    }

    fn process(&self, context: &PacketContext) {
        if !admit(context, &self.stats) {
            return;
        }
        let decision = self.engine.on_packet(context.inbound());
        execute(decision, Some(context), self.actuator.as_ref(), &self.stats);
    }

    fn config_event(&self, event: &NetworkConfigEvent) {
        self.stats.config_events.inc();
        match translate(event, self.provider.as_ref()) {
            Ok(relay_event) => {
                let decision = self.engine.on_event(relay_event);
                execute(decision, None, self.actuator.as_ref(), &self.stats);
            }
            Err(reason) => self.stats.record_drop(reason),
        }
    }

    fn stats(&self) -> &AppStats {
        &self.stats
    }
}
