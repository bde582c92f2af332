//! Network-config records and their translation into relay events
//!
//! The platform keeps typed records per application and notifies
//! listeners with the event type, the record class and the location the
//! write carried. `NetworkConfigStore` plays that role here, and
//! `translate` turns an event into the single tagged event the relay
//! understands. Events built without a location fall back to reading the
//! current record.

use super::{DhcpConfig, HostConfig};
use crate::dataplane::{Dependency, DropReason, EndpointRole, RelayEvent};
use crate::fabric::ConnectPoint;
use crate::{Error, Result};
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, info};

/// Record classes the relay listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigClass {
    Host,
    Dhcp,
}

impl ConfigClass {
    /// Key the class is registered under
    pub fn config_key(self) -> &'static str {
        match self {
            ConfigClass::Host => "HostConfig",
            ConfigClass::Dhcp => "UnicastDhcpConfig",
        }
    }
}

impl fmt::Display for ConfigClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkConfigEventType {
    ConfigAdded,
    ConfigUpdated,
    ConfigRemoved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfigEvent {
    pub event_type: NetworkConfigEventType,
    pub config_class: ConfigClass,
    /// Location written by this change; `None` for removals
    pub location: Option<ConnectPoint>,
}

/// Both records as currently stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointPairConfig {
    pub host: Option<HostConfig>,
    pub dhcp: Option<DhcpConfig>,
}

/// Read side of the network-config service
pub trait ConfigProvider: Send + Sync {
    /// Current records, or `None` if nothing was ever configured
    fn current_config(&self) -> Option<EndpointPairConfig>;
}

/// In-memory network-config service
#[derive(Debug, Default)]
pub struct NetworkConfigStore {
    records: ArcSwap<EndpointPairConfig>,
}

impl NetworkConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn event(class: ConfigClass, existed: bool, location: ConnectPoint) -> NetworkConfigEvent {
        NetworkConfigEvent {
            event_type: if existed {
                NetworkConfigEventType::ConfigUpdated
            } else {
                NetworkConfigEventType::ConfigAdded
            },
            config_class: class,
            location: Some(location),
        }
    }

    pub fn set_host(&self, record: HostConfig) -> NetworkConfigEvent {
        let previous = self.records.rcu(|current| EndpointPairConfig {
            host: Some(record.clone()),
            dhcp: current.dhcp.clone(),
        });
        Self::event(ConfigClass::Host, previous.host.is_some(), record.host_location)
    }

    pub fn set_dhcp(&self, record: DhcpConfig) -> NetworkConfigEvent {
        let previous = self.records.rcu(|current| EndpointPairConfig {
            host: current.host.clone(),
            dhcp: Some(record.clone()),
        });
        Self::event(ConfigClass::Dhcp, previous.dhcp.is_some(), record.server_location)
    }

    pub fn remove(&self, class: ConfigClass) -> NetworkConfigEvent {
        self.records.rcu(|current| {
            let mut next = EndpointPairConfig::clone(current);
            match class {
                ConfigClass::Host => next.host = None,
                ConfigClass::Dhcp => next.dhcp = None,
            }
            next
        });
        NetworkConfigEvent {
            event_type: NetworkConfigEventType::ConfigRemoved,
            config_class: class,
            location: None,
        }
    }

    /// Parse a raw record of `class` and store it
    pub fn apply(&self, class: ConfigClass, record: toml::Value) -> Result<NetworkConfigEvent> {
        let event = match class {
            ConfigClass::Host => self.set_host(parse_record(class, record)?),
            ConfigClass::Dhcp => self.set_dhcp(parse_record(class, record)?),
        };
        debug!("netcfg: {:?} {}", event.event_type, class);
        Ok(event)
    }
}

impl ConfigProvider for NetworkConfigStore {
    fn current_config(&self) -> Option<EndpointPairConfig> {
        let records = self.records.load();
        if records.host.is_none() && records.dhcp.is_none() {
            return None;
        }
        Some(EndpointPairConfig::clone(&records))
    }
}

/// Decode one record; a record is valid only with exactly its one field
pub fn parse_record<T: DeserializeOwned>(class: ConfigClass, record: toml::Value) -> Result<T> {
    record
        .try_into()
        .map_err(|e| Error::Config(format!("invalid {} record: {}", class, e)))
}

/// Turn a config notification into a relay event
///
/// Only added/updated events are acted on. The location the event carries
/// wins over whatever the provider holds now, so a later write cannot
/// mask an earlier one. An event with neither is a missing dependency.
pub fn translate(
    event: &NetworkConfigEvent,
    provider: &dyn ConfigProvider,
) -> std::result::Result<RelayEvent, DropReason> {
    match event.event_type {
        NetworkConfigEventType::ConfigAdded | NetworkConfigEventType::ConfigUpdated => {}
        NetworkConfigEventType::ConfigRemoved => {
            debug!("netcfg: ignoring removal of {}", event.config_class);
            return Err(DropReason::NotRelevant);
        }
    }

    let role = match event.config_class {
        ConfigClass::Host => EndpointRole::Ingress,
        ConfigClass::Dhcp => EndpointRole::Egress,
    };
    if let Some(point) = &event.location {
        return Ok(RelayEvent::EndpointUpdated(role, point.clone()));
    }

    let missing = || {
        info!("netcfg: {} is not available", event.config_class);
        DropReason::MissingDependency(Dependency::Configuration)
    };
    let records = provider.current_config().ok_or_else(missing)?;

    let point = match event.config_class {
        ConfigClass::Host => records.host.map(|r| r.host_location),
        ConfigClass::Dhcp => records.dhcp.map(|r| r.server_location),
    };
    point
        .map(|p| RelayEvent::EndpointUpdated(role, p))
        .ok_or_else(missing)
}
