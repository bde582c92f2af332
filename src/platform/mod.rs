//! Controller platform stand-in
//!
//! Wires an app to an actuator and a network-config store, seeds the
//! store from the startup records, and replays events through the
//! dispatcher.

mod dispatcher;
pub mod trace;

pub use dispatcher::{Dispatcher, PlatformEvent, DEFAULT_AGING_INTERVAL, DEFAULT_QUEUE_DEPTH};
pub use trace::{Trace, TraceEvent, TraceFrame};

use crate::apps::{App, BridgeApp, ProxyArpApp, UnicastDhcpApp};
use crate::config::{
    Config, DhcpConfig, HostConfig, NetcfgConfig, NetworkConfigEvent, NetworkConfigStore,
};
use crate::fabric::NetworkActuator;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Bridge,
    ProxyArp,
    UnicastDhcp,
}

impl AppKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::Bridge => "bridge",
            AppKind::ProxyArp => "proxy-arp",
            AppKind::UnicastDhcp => "unicast-dhcp",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bridge" => Ok(AppKind::Bridge),
            "proxy-arp" | "proxyarp" => Ok(AppKind::ProxyArp),
            "unicast-dhcp" | "unicastdhcp" => Ok(AppKind::UnicastDhcp),
            other => Err(Error::Parse(format!("unknown app: {}", other))),
        }
    }
}

/// Build the app named by `kind` from its config section
pub fn build_app(
    kind: AppKind,
    config: &Config,
    actuator: Arc<dyn NetworkActuator>,
    store: Arc<NetworkConfigStore>,
) -> Arc<dyn App> {
    match kind {
        AppKind::Bridge => Arc::new(BridgeApp::new(&config.bridge, actuator)),
        AppKind::ProxyArp => Arc::new(ProxyArpApp::new(&config.proxy_arp, actuator)),
        AppKind::UnicastDhcp => {
            Arc::new(UnicastDhcpApp::new(&config.unicast_dhcp, actuator, store))
        }
    }
}

/// Write the startup records into `store`
///
/// Returns the events the writes produced, host record first.
pub fn seed_store(
    netcfg: &NetcfgConfig,
    store: &NetworkConfigStore,
) -> Result<Vec<NetworkConfigEvent>> {
    let mut events = Vec::new();
    if let Some(token) = &netcfg.host_location {
        let host_location = token.parse()?;
        events.push(store.set_host(HostConfig { host_location }));
    }
    if let Some(token) = &netcfg.server_location {
        let server_location = token.parse()?;
        events.push(store.set_dhcp(DhcpConfig { server_location }));
    }
    for event in &events {
        info!("netcfg: seeded {}", event.config_class.config_key());
    }
    Ok(events)
}

/// Activate `app`, run startup records then `trace` through a dispatcher
/// with `workers` workers, sweep expired entries, and deactivate it
///
/// Returns how many events were delivered.
pub async fn replay(
    app: Arc<dyn App>,
    store: &NetworkConfigStore,
    netcfg: &NetcfgConfig,
    trace: Trace,
    workers: usize,
) -> Result<usize> {
    app.activate();

    // Startup records are applied before any packet is seen
    let mut delivered = 0;
    for event in seed_store(netcfg, store)? {
        Dispatcher::deliver(app.as_ref(), PlatformEvent::Config(event));
        delivered += 1;
    }

    let events = trace.into_events(store)?;
    delivered += Dispatcher::new(Arc::clone(&app), workers)
        .with_aging(DEFAULT_AGING_INTERVAL)
        .run(events)
        .await;

    let aged = app.run_aging();
    if aged > 0 {
        info!("aged out {} entries", aged);
    }
    app.deactivate();
    Ok(delivered)
}
