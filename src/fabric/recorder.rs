//! Actuator that keeps every outbound call in memory
//!
//! Used by the replay command and the tests in place of a live controller.

use super::{
    ApplicationId, FlowRule, NetworkActuator, OutboundPacket, PacketPriority, PathIntent,
    TrafficSelector,
};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// One recorded outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorCall {
    Emit(OutboundPacket),
    InstallFlowRule(FlowRule),
    SubmitIntent(PathIntent),
    RequestPackets {
        selector: TrafficSelector,
        priority: PacketPriority,
        app: ApplicationId,
    },
    CancelPackets {
        selector: TrafficSelector,
        priority: PacketPriority,
        app: ApplicationId,
    },
}

#[derive(Debug, Default)]
pub struct RecordingActuator {
    calls: Mutex<Vec<ActuatorCall>>,
    /// Log each call at info level as it is recorded
    verbose: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self {
            calls: Mutex::default(),
            verbose: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ActuatorCall>> {
        // A panicking writer can only have pushed a complete call
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: ActuatorCall) {
        if self.verbose {
            match &call {
                ActuatorCall::Emit(p) => {
                    info!("emit {} bytes out {}/{}", p.data.len(), p.device, p.output)
                }
                ActuatorCall::InstallFlowRule(r) => info!(
                    "flow rule on {}: {} -> {} (priority {})",
                    r.device, r.selector, r.output, r.priority
                ),
                ActuatorCall::SubmitIntent(i) => info!(
                    "intent {} -> {} {} (priority {})",
                    i.ingress, i.egress, i.selector, i.priority
                ),
                ActuatorCall::RequestPackets {
                    selector,
                    priority,
                    app,
                } => info!(
                    "{} intercepts {} (priority {})",
                    app,
                    selector,
                    priority.value()
                ),
                ActuatorCall::CancelPackets { selector, app, .. } => {
                    info!("{} cancels {}", app, selector)
                }
            }
        }
        self.lock().push(call);
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn emitted(&self) -> Vec<OutboundPacket> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Emit(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn flow_rules(&self) -> Vec<FlowRule> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::InstallFlowRule(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn intents(&self) -> Vec<PathIntent> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::SubmitIntent(i) => Some(i.clone()),
                _ => None,
            })
            .collect()
    }

    /// Selectors currently intercepted (requests minus cancellations)
    pub fn intercepts(&self) -> Vec<(TrafficSelector, PacketPriority)> {
        let mut active: Vec<(TrafficSelector, PacketPriority)> = Vec::new();
        for call in self.lock().iter() {
            match call {
                ActuatorCall::RequestPackets {
                    selector, priority, ..
                } => {
                    if !active.iter().any(|(s, p)| s == selector && p == priority) {
                        active.push((selector.clone(), *priority));
                    }
                }
                ActuatorCall::CancelPackets {
                    selector, priority, ..
                } => active.retain(|(s, p)| !(s == selector && p == priority)),
                _ => {}
            }
        }
        active
    }
}

impl NetworkActuator for RecordingActuator {
    fn emit(&self, packet: OutboundPacket) {
        self.record(ActuatorCall::Emit(packet));
    }

    fn install_flow_rule(&self, rule: FlowRule) {
        self.record(ActuatorCall::InstallFlowRule(rule));
    }

    fn submit_intent(&self, intent: PathIntent) {
        self.record(ActuatorCall::SubmitIntent(intent));
    }

    fn request_packets(&self, selector: &TrafficSelector, priority: PacketPriority, app: &ApplicationId) {
        self.record(ActuatorCall::RequestPackets {
            selector: selector.clone(),
            priority,
            app: app.clone(),
        });
    }

    fn cancel_packets(&self, selector: &TrafficSelector, priority: PacketPriority, app: &ApplicationId) {
        self.record(ActuatorCall::CancelPackets {
            selector: selector.clone(),
            priority,
            app: app.clone(),
        });
    }
}
