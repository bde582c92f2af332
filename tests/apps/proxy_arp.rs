//! Proxy ARP

use super::{mac, packet_in};
use std::net::Ipv4Addr;
use std::sync::Arc;
use switchboard::apps::{App, ProxyArpApp};
use switchboard::config::ProxyArpConfig;
use switchboard::fabric::{PacketPriority, PortNumber, RecordingActuator, TrafficSelector};
use switchboard::protocol::arp::{ArpOp, ArpPacket};
use switchboard::protocol::ethernet::Frame;

const IP_1: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const IP_2: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

fn proxy(config: ProxyArpConfig) -> (ProxyArpApp, Arc<RecordingActuator>) {
    let actuator = Arc::new(RecordingActuator::new());
    let app = ProxyArpApp::new(&config, actuator.clone());
    (app, actuator)
}

#[test]
fn test_activate_intercepts_arp() {
    let (app, actuator) = proxy(ProxyArpConfig::default());
    app.activate();
    assert_eq!(
        actuator.intercepts(),
        vec![(
            TrafficSelector::builder().match_eth_type(0x0806),
            PacketPriority::Reactive
        )]
    );
    app.deactivate();
    assert!(actuator.intercepts().is_empty());
}

#[test]
fn test_second_request_answered_from_table() {
    let (app, actuator) = proxy(ProxyArpConfig::default());

    // h1 asks for h2: unknown, flood
    let who_has_2 = ArpPacket::request(mac(1), IP_1, IP_2);
    app.process(&packet_in("s1", 1, who_has_2.to_frame()));
    assert_eq!(actuator.emitted()[0].output, PortNumber::FLOOD);

    // h2's reply teaches the table; without forwarding it goes nowhere
    let reply = ArpPacket::reply(mac(2), IP_2, mac(1), IP_1);
    app.process(&packet_in("s2", 1, reply.to_frame()));
    assert_eq!(actuator.emitted().len(), 1);
    assert_eq!(app.stats().drops.missing_dependency.get(), 1);

    // h3 asks for h2 from another switch: answered directly
    let who_has_2 = ArpPacket::request(mac(3), Ipv4Addr::new(10, 0, 0, 3), IP_2);
    app.process(&packet_in("s3", 4, who_has_2.to_frame()));

    let emitted = actuator.emitted();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[1].device.as_str(), "s3");
    assert_eq!(emitted[1].output, PortNumber::new(4));

    let frame = Frame::parse(&emitted[1].data).unwrap();
    assert_eq!(frame.src_mac(), mac(2));
    assert_eq!(frame.dst_mac(), mac(3));
    let answer = ArpPacket::parse(frame.payload()).unwrap();
    assert_eq!(answer.operation, ArpOp::Reply);
    assert_eq!(answer.sender_ip, IP_2);
    assert_eq!(answer.sender_mac, mac(2));
    assert_eq!(answer.target_ip, Ipv4Addr::new(10, 0, 0, 3));

    assert_eq!(app.stats().arp_replies.get(), 1);
    assert_eq!(app.engine().arp_table().len(), 3);
}

#[test]
fn test_reply_forwarding_returns_reply_once() {
    let (app, actuator) = proxy(ProxyArpConfig {
        reply_forwarding: true,
        ..Default::default()
    });

    app.process(&packet_in(
        "s1",
        1,
        ArpPacket::request(mac(1), IP_1, IP_2).to_frame(),
    ));
    let reply = ArpPacket::reply(mac(2), IP_2, mac(1), IP_1).to_frame();
    app.process(&packet_in("s2", 1, reply.clone()));

    let emitted = actuator.emitted();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[1].device.as_str(), "s1");
    assert_eq!(emitted[1].output, PortNumber::new(1));
    assert_eq!(emitted[1].data, reply);

    // A returned reply is not one the proxy answered itself
    assert_eq!(app.stats().arp_replies.get(), 0);
    assert_eq!(app.stats().packets_emitted.get(), 1);

    // The pending entry was consumed
    app.process(&packet_in("s2", 1, reply));
    assert_eq!(actuator.emitted().len(), 2);
}

#[test]
fn test_non_arp_ignored() {
    let (app, actuator) = proxy(ProxyArpConfig::default());
    app.process(&packet_in("s1", 1, super::ethernet(mac(1), mac(2))));
    assert!(actuator.calls().is_empty());
    assert_eq!(app.stats().drops.not_relevant.get(), 1);
}

#[test]
fn test_run_aging_purges_bindings_and_pending_requests() {
    let (app, actuator) = proxy(ProxyArpConfig {
        max_age_secs: Some(0),
        reply_forwarding: true,
        pending_ttl_secs: 0,
        ..Default::default()
    });

    app.process(&packet_in(
        "s1",
        1,
        ArpPacket::request(mac(1), IP_1, IP_2).to_frame(),
    ));
    assert_eq!(app.engine().arp_table().len(), 1);
    assert_eq!(app.engine().pending().len(), 1);

    assert_eq!(app.run_aging(), 2);
    assert!(app.engine().arp_table().is_empty());
    assert!(app.engine().pending().is_empty());

    // With the pending entry gone the reply has nowhere to go
    app.process(&packet_in(
        "s2",
        1,
        ArpPacket::reply(mac(2), IP_2, mac(1), IP_1).to_frame(),
    ));
    assert_eq!(actuator.emitted().len(), 1);
}
