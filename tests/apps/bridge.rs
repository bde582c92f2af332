//! Learning bridge
//!
//! Topology:
//! ```text
//! h1 --1-- s1 --2-- h2
//!          |
//!          3
//!          |
//!          h3
//! ```

use super::{ethernet, mac, packet_in};
use std::sync::Arc;
use std::time::Duration;
use switchboard::apps::{App, BridgeApp};
use switchboard::config::BridgeConfig;
use switchboard::fabric::{PacketPriority, PortNumber, RecordingActuator, TrafficSelector};

fn bridge() -> (BridgeApp, Arc<RecordingActuator>) {
    let actuator = Arc::new(RecordingActuator::new());
    let app = BridgeApp::new(&BridgeConfig::default(), actuator.clone());
    (app, actuator)
}

#[test]
fn test_activate_intercepts_ipv4() {
    let (app, actuator) = bridge();
    app.activate();

    let intercepts = actuator.intercepts();
    assert_eq!(intercepts.len(), 1);
    assert_eq!(
        intercepts[0],
        (
            TrafficSelector::builder().match_eth_type(0x0800),
            PacketPriority::Reactive
        )
    );

    app.deactivate();
    assert!(actuator.intercepts().is_empty());
}

#[test]
fn test_ping_exchange_installs_one_rule() {
    let (app, actuator) = bridge();

    // h1 -> h2: h2 unknown, flood
    app.process(&packet_in("s1", 1, ethernet(mac(1), mac(2))));
    let emitted = actuator.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].output, PortNumber::FLOOD);
    assert!(actuator.flow_rules().is_empty());

    // h2 -> h1: h1 learned on port 1
    app.process(&packet_in("s1", 2, ethernet(mac(2), mac(1))));
    let rules = actuator.flow_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].output, PortNumber::new(1));
    assert_eq!(rules[0].priority, 30);
    assert_eq!(rules[0].idle_timeout, Some(Duration::from_secs(30)));
    assert_eq!(rules[0].app_id.name(), "nctu.winlab.bridge");
    assert_eq!(actuator.emitted()[1].output, PortNumber::new(1));

    let stats = app.stats();
    assert_eq!(stats.packets_seen.get(), 2);
    assert_eq!(stats.floods.get(), 1);
    assert_eq!(stats.rules_installed.get(), 1);
}

#[test]
fn test_handled_context_is_skipped() {
    let (app, actuator) = bridge();
    let ctx = packet_in("s1", 1, ethernet(mac(1), mac(2)));
    assert!(ctx.block());

    app.process(&ctx);
    assert!(actuator.calls().is_empty());
    assert_eq!(app.stats().drops.already_handled.get(), 1);
    assert!(app.engine().table().is_empty());
}

#[test]
fn test_host_move_redirects() {
    let (app, actuator) = bridge();
    app.process(&packet_in("s1", 1, ethernet(mac(1), mac(9))));
    // h1 reappears behind port 3
    app.process(&packet_in("s1", 3, ethernet(mac(1), mac(9))));
    app.process(&packet_in("s1", 2, ethernet(mac(2), mac(1))));

    let rules = actuator.flow_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].output, PortNumber::new(3));
}

#[test]
fn test_runt_frame_dropped() {
    let (app, actuator) = bridge();
    app.process(&packet_in("s1", 1, vec![0u8; 6]));
    assert!(actuator.calls().is_empty());
    assert_eq!(app.stats().drops.not_parseable.get(), 1);
}

#[test]
fn test_run_aging_purges_expired_hosts() {
    let actuator = Arc::new(RecordingActuator::new());
    let config = BridgeConfig {
        max_age_secs: Some(0),
        ..Default::default()
    };
    let app = BridgeApp::new(&config, actuator);

    app.process(&packet_in("s1", 1, ethernet(mac(1), mac(2))));
    app.process(&packet_in("s2", 1, ethernet(mac(1), mac(2))));
    assert_eq!(app.engine().table().len(), 2);

    // A zero max age expires everything on the next sweep
    assert_eq!(app.run_aging(), 2);
    assert!(app.engine().table().is_empty());
    assert_eq!(app.run_aging(), 0);
}

#[test]
fn test_run_aging_without_max_age_keeps_hosts() {
    let (app, _actuator) = bridge();
    app.process(&packet_in("s1", 1, ethernet(mac(1), mac(2))));
    assert_eq!(app.run_aging(), 0);
    assert_eq!(app.engine().table().len(), 1);
}
