//! Unicast DHCP relay
//!
//! Topology:
//! ```text
//! client --1-- s1 ---- s2 ---- s4 --1-- dhcp server
//!               \
//!                2-- client2
//! ```

use super::{mac, packet_in};
use std::sync::Arc;
use switchboard::apps::{App, UnicastDhcpApp};
use switchboard::config::{
    ConfigClass, ConfigProvider, DhcpConfig, HostConfig, NetworkConfigStore, UnicastDhcpConfig,
};
use switchboard::dataplane::{dhcp_selector, RelayMode};
use switchboard::fabric::{ConnectPoint, PacketPriority, RecordingActuator};
use switchboard::platform::TraceFrame;

struct Harness {
    app: UnicastDhcpApp,
    actuator: Arc<RecordingActuator>,
    store: Arc<NetworkConfigStore>,
}

fn relay(mode: RelayMode) -> Harness {
    let actuator = Arc::new(RecordingActuator::new());
    let store = Arc::new(NetworkConfigStore::new());
    let config = UnicastDhcpConfig {
        mode,
        ..Default::default()
    };
    let app = UnicastDhcpApp::new(&config, actuator.clone(), store.clone());
    Harness {
        app,
        actuator,
        store,
    }
}

fn discover() -> Vec<u8> {
    TraceFrame::Dhcp {
        client_mac: mac(1),
        from_server: false,
    }
    .build()
}

fn server() -> DhcpConfig {
    DhcpConfig {
        server_location: ConnectPoint::new("s4", 1),
    }
}

#[test]
fn test_static_mode_needs_both_records() {
    let h = relay(RelayMode::Static);
    h.app.activate();
    assert!(h.actuator.intercepts().is_empty());

    h.app.config_event(&h.store.set_dhcp(server()));
    assert!(h.actuator.intents().is_empty());
    assert_eq!(h.app.stats().drops.missing_dependency.get(), 1);

    h.app.config_event(&h.store.set_host(HostConfig {
        host_location: ConnectPoint::new("s1", 1),
    }));
    let intents = h.actuator.intents();
    assert_eq!(intents.len(), 2);
    assert_eq!(intents[0].ingress.connect_point, ConnectPoint::new("s1", 1));
    assert_eq!(intents[0].egress.connect_point, ConnectPoint::new("s4", 1));
    assert_eq!(intents[1].ingress.connect_point, ConnectPoint::new("s4", 1));
    assert_eq!(intents[1].egress.connect_point, ConnectPoint::new("s1", 1));
    assert_eq!(intents[0].priority, 50000);
    assert_eq!(intents[0].selector, dhcp_selector());
    assert_eq!(intents[0].app_id.name(), "nctu.winlab.unicastdhcp");
}

#[test]
fn test_static_mode_ignores_packets() {
    let h = relay(RelayMode::Static);
    h.app.config_event(&h.store.set_dhcp(server()));
    h.app.process(&packet_in("s1", 2, discover()));

    assert!(h.actuator.intents().is_empty());
    assert_eq!(h.app.stats().drops.not_relevant.get(), 1);
}

#[test]
fn test_reactive_mode_follows_clients() {
    let h = relay(RelayMode::Reactive);
    h.app.activate();
    assert_eq!(
        h.actuator.intercepts(),
        vec![(dhcp_selector(), PacketPriority::Reactive)]
    );

    // Client before server: nothing to connect yet
    h.app.process(&packet_in("s1", 1, discover()));
    assert!(h.actuator.intents().is_empty());

    h.app.config_event(&h.store.set_dhcp(server()));
    assert_eq!(h.actuator.intents().len(), 2);

    // A second client elsewhere re-points the pair
    h.app.process(&packet_in("s1", 2, discover()));
    let intents = h.actuator.intents();
    assert_eq!(intents.len(), 4);
    assert_eq!(intents[2].ingress.connect_point, ConnectPoint::new("s1", 2));
    assert_eq!(
        h.app.engine().endpoints().ingress,
        Some(ConnectPoint::new("s1", 2))
    );

    h.app.deactivate();
    assert!(h.actuator.intercepts().is_empty());
}

#[test]
fn test_reactive_mode_ignores_configured_host() {
    let h = relay(RelayMode::Reactive);
    h.app.config_event(&h.store.set_dhcp(server()));
    h.app.config_event(&h.store.set_host(HostConfig {
        host_location: ConnectPoint::new("s1", 1),
    }));

    assert!(h.actuator.intents().is_empty());
    assert_eq!(h.app.engine().endpoints().ingress, None);
}

#[test]
fn test_removed_record_is_not_relevant() {
    let h = relay(RelayMode::Static);
    h.app.config_event(&h.store.set_dhcp(server()));
    h.app.config_event(&h.store.remove(ConfigClass::Dhcp));

    assert_eq!(h.store.current_config(), None);
    assert_eq!(h.app.stats().config_events.get(), 2);
    assert_eq!(h.app.stats().drops.not_relevant.get(), 1);
    // Endpoints are not withdrawn by a removal
    assert_eq!(
        h.app.engine().endpoints().egress,
        Some(ConnectPoint::new("s4", 1))
    );
}
