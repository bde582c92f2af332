//! Config file plus trace file, end to end

use std::io::Write;
use std::sync::Arc;
use switchboard::apps::{App, BridgeApp};
use switchboard::config::{self, NetworkConfigStore};
use switchboard::fabric::{PortNumber, RecordingActuator};
use switchboard::platform::{self, trace, AppKind};

fn write_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_replay_reactive_relay_from_files() {
    let config_file = write_file(
        r#"
        [unicast_dhcp]
        mode = "reactive"

        [netcfg]
        server_location = "s4/1"
        "#,
    );
    let trace_file = write_file(
        r#"
        [[event]]
        kind = "packet"
        at = "s1/1"
        frame = { type = "dhcp", client_mac = "00:00:00:00:00:01" }

        [[event]]
        kind = "packet"
        at = "s1/1"
        frame = { type = "ethernet", src = "00:00:00:00:00:01", dst = "01:80:c2:00:00:0e", ethertype = 0x88cc }
        "#,
    );

    let cfg = config::load(config_file.path()).unwrap();
    assert!(!config::validate(&cfg).has_errors());
    let trace = trace::load(trace_file.path()).unwrap();

    let actuator = Arc::new(RecordingActuator::new());
    let store = Arc::new(NetworkConfigStore::new());
    let app = platform::build_app(AppKind::UnicastDhcp, &cfg, actuator.clone(), store.clone());

    let delivered = platform::replay(app.clone(), &store, &cfg.netcfg, trace, 1)
        .await
        .unwrap();
    assert_eq!(delivered, 3);
    assert_eq!(actuator.intents().len(), 2);
    assert_eq!(app.stats().packets_seen.get(), 2);
    assert_eq!(app.stats().drops.not_relevant.get(), 1);
}

#[tokio::test]
async fn test_replay_bridge_with_workers() {
    let cfg = config::parse("[bridge]\npriority = 40").unwrap();
    let trace = trace::parse(
        r#"
        [[event]]
        kind = "packet"
        at = "s1/1"
        frame = { type = "ethernet", src = "00:00:00:00:00:01", dst = "00:00:00:00:00:02" }
        "#,
    )
    .unwrap();

    let actuator = Arc::new(RecordingActuator::new());
    let store = Arc::new(NetworkConfigStore::new());
    let app = platform::build_app(AppKind::Bridge, &cfg, actuator.clone(), store.clone());

    let delivered = platform::replay(app.clone(), &store, &cfg.netcfg, trace, 4)
        .await
        .unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(actuator.emitted()[0].output, PortNumber::FLOOD);
    // Activation and deactivation both went through
    assert!(actuator.intercepts().is_empty());
}

#[tokio::test]
async fn test_replay_ends_with_an_aging_sweep() {
    let cfg = config::parse("[bridge]\nmax_age_secs = 0").unwrap();
    let trace = trace::parse(
        r#"
        [[event]]
        kind = "packet"
        at = "s1/1"
        frame = { type = "ethernet", src = "00:00:00:00:00:01", dst = "00:00:00:00:00:02" }

        [[event]]
        kind = "packet"
        at = "s2/1"
        frame = { type = "ethernet", src = "00:00:00:00:00:01", dst = "00:00:00:00:00:02" }
        "#,
    )
    .unwrap();

    let actuator = Arc::new(RecordingActuator::new());
    let store = Arc::new(NetworkConfigStore::new());
    let bridge = Arc::new(BridgeApp::new(&cfg.bridge, actuator.clone()));
    let app: Arc<dyn App> = bridge.clone();

    let delivered = platform::replay(app, &store, &cfg.netcfg, trace, 2)
        .await
        .unwrap();
    assert_eq!(delivered, 2);
    assert_eq!(actuator.emitted().len(), 2);
    assert!(bridge.engine().table().is_empty());
}

async fn replay_static_relay(trace_toml: &str) -> (Arc<RecordingActuator>, Arc<dyn App>) {
    let cfg = config::Config::default();
    let trace = trace::parse(trace_toml).unwrap();

    let actuator = Arc::new(RecordingActuator::new());
    let store = Arc::new(NetworkConfigStore::new());
    let app = platform::build_app(AppKind::UnicastDhcp, &cfg, actuator.clone(), store.clone());
    platform::replay(app.clone(), &store, &cfg.netcfg, trace, 1)
        .await
        .unwrap();
    (actuator, app)
}

#[tokio::test]
async fn test_replay_config_sees_records_in_trace_order() {
    let (actuator, app) = replay_static_relay(
        r#"
        [[event]]
        kind = "config"
        class = "host"
        record = { hostLocation = "s1/1" }

        [[event]]
        kind = "config"
        class = "dhcp"
        record = { serverLocation = "s4/1" }

        [[event]]
        kind = "remove"
        class = "host"
        "#,
    )
    .await;

    // The host record existed when the server record arrived
    assert_eq!(actuator.intents().len(), 2);
    assert_eq!(app.stats().drops.missing_dependency.get(), 1);
    assert_eq!(app.stats().drops.not_relevant.get(), 1);
}

#[tokio::test]
async fn test_replay_keeps_intermediate_server_location() {
    let (actuator, _app) = replay_static_relay(
        r#"
        [[event]]
        kind = "config"
        class = "host"
        record = { hostLocation = "s1/1" }

        [[event]]
        kind = "config"
        class = "dhcp"
        record = { serverLocation = "s4/1" }

        [[event]]
        kind = "config"
        class = "dhcp"
        record = { serverLocation = "s5/1" }
        "#,
    )
    .await;

    let egresses: Vec<String> = actuator
        .intents()
        .iter()
        .map(|i| i.egress.connect_point.to_string())
        .collect();
    assert_eq!(egresses, ["s4/1", "s1/1", "s5/1", "s1/1"]);
}

#[test]
fn test_lock_round_trips() {
    let cfg = config::parse(
        r#"
        [proxy_arp]
        reply_forwarding = true
        "#,
    )
    .unwrap();
    let lock = config::generate_lock(&cfg).unwrap();
    assert!(lock.contains("pending_ttl_secs = 5"));
    assert_eq!(config::parse(&lock).unwrap(), cfg);
}
