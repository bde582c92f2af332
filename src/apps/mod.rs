//! Controller apps
//!
//! Each app wraps one decision engine: it registers its packet
//! intercepts on activation, feeds punted packets (and, for the relay,
//! config events) to the engine, and carries out the resulting decision
//! through the actuator.

mod bridge;
mod proxy_arp;
mod unicast_dhcp;

pub use bridge::BridgeApp;
pub use proxy_arp::ProxyArpApp;
pub use unicast_dhcp::UnicastDhcpApp;

use crate::config::NetworkConfigEvent;
use crate::dataplane::{Decision, DropReason};
use crate::fabric::{ApplicationId, NetworkActuator, OutboundPacket, PacketContext, PortNumber};
use crate::telemetry::AppStats;
use tracing::{debug, trace};

/// Lifecycle and event entry points shared by every app
pub trait App: Send + Sync {
    fn app_id(&self) -> &ApplicationId;

    /// Request the packet intercepts this app needs
    fn activate(&self);

    /// Withdraw everything `activate` requested
    fn deactivate(&self);

    /// Handle one packet-in
    fn process(&self, context: &PacketContext);

    /// Handle one network-config notification; most apps ignore them
    fn config_event(&self, _event: &NetworkConfigEvent) {}

    /// Purge expired table entries, returning how many went
    fn run_aging(&self) -> usize {
        0
    }

    fn stats(&self) -> &AppStats;
}

/// Carry out `decision`, updating `stats`
///
/// `context` is the packet-in the decision was made for, if any; it is
/// marked handled once anything is sent on its behalf.
pub(crate) fn execute(
    decision: Decision,
    context: Option<&PacketContext>,
    actuator: &dyn NetworkActuator,
    stats: &AppStats,
) {
    match decision {
        Decision::Flood => {
            if let Some(ctx) = context {
                if ctx.send(PortNumber::FLOOD, actuator) {
                    stats.floods.inc();
                }
            }
        }
        Decision::ForwardAndInstall { out_port, rule } => {
            debug!(
                "installing {} on {} -> {}",
                rule.selector, rule.device, rule.output
            );
            actuator.install_flow_rule(rule);
            stats.rules_installed.inc();
            if let Some(ctx) = context {
                if ctx.send(out_port, actuator) {
                    stats.packets_emitted.inc();
                }
            }
        }
        Decision::InstallPath { forward, reverse } => {
            actuator.submit_intent(forward);
            actuator.submit_intent(reverse);
            stats.intents_submitted.add(2);
        }
        Decision::EmitSynthesized { frame, to } => {
            actuator.emit(OutboundPacket::new(&to, frame));
            stats.packets_emitted.inc();
            if let Some(ctx) = context {
                ctx.block();
            }
        }
        Decision::Redirect { to } => {
            if let Some(ctx) = context {
                if ctx.block() {
                    actuator.emit(OutboundPacket::new(&to, ctx.inbound().data.clone()));
                    stats.packets_emitted.inc();
                }
            }
        }
        Decision::Drop(reason) => {
            trace!("drop: {}", reason);
            stats.record_drop(reason);
        }
    }
}

/// Common front half of `process`: count the packet and skip handled ones
pub(crate) fn admit(context: &PacketContext, stats: &AppStats) -> bool {
    stats.packets_seen.inc();
    if context.is_handled() {
        stats.record_drop(DropReason::AlreadyHandled);
        return false;
    }
    true
}
