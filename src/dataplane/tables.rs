//! Lookup tables shared by the decision engines
//!
//! Every table has overwrite-on-put semantics: the latest observation
//! wins and no conflict detection is done. Entries never expire unless
//! the table was built with a maximum age, in which case a stale entry
//! reads as a miss and `age_out` purges it.
//!
//! Tables are `DashMap`-backed, so concurrent handlers can read and
//! write through `&self` without corrupting a shard.

use crate::fabric::{ConnectPoint, DeviceId, PortNumber};
use crate::protocol::MacAddr;
use dashmap::DashMap;
use std::hash::Hash;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    last_seen: Instant,
}

impl<V> Entry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, max_age: Option<Duration>, now: Instant) -> bool {
        max_age.is_some_and(|age| now.duration_since(self.last_seen) >= age)
    }
}

/// Concurrent key/value table with optional age-based expiry
#[derive(Debug)]
pub struct KeyedTable<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V>>,
    max_age: Option<Duration>,
}

impl<K, V> Default for KeyedTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            max_age: None,
        }
    }
}

impl<K, V> KeyedTable<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a table; `None` keeps entries for the life of the process
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Look up a live entry
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(self.max_age, now) {
                return Some(entry.value.clone());
            }
        }
        // Shard guard dropped above; re-check so a fresh put is not lost
        self.entries
            .remove_if(key, |_, e| e.is_expired(self.max_age, now));
        None
    }

    /// Insert or overwrite, returning the previous live value
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let now = Instant::now();
        self.entries
            .insert(key, Entry::new(value))
            .filter(|old| !old.is_expired(self.max_age, now))
            .map(|old| old.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove and return a live entry
    pub fn take(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .filter(|(_, e)| !e.is_expired(self.max_age, now))
            .map(|(_, e)| e.value)
    }

    /// Drop expired entries, returning how many were removed
    pub fn age_out(&self) -> usize {
        if self.max_age.is_none() {
            return 0;
        }
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, e| !e.is_expired(self.max_age, now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// IPv4 to MAC bindings learned from ARP traffic
pub type ArpTable = KeyedTable<Ipv4Addr, MacAddr>;

/// Where an unanswered ARP request came from, keyed by requester IP
pub type ConnectPointCache = KeyedTable<Ipv4Addr, ConnectPoint>;

/// Per-device MAC learning table
///
/// Two levels: device, then source MAC to ingress port. A device's
/// sub-table is created on its first observation.
#[derive(Debug, Default)]
pub struct LearningTable {
    devices: DashMap<DeviceId, KeyedTable<MacAddr, PortNumber>>,
    max_age: Option<Duration>,
}

impl LearningTable {
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            devices: DashMap::new(),
            max_age,
        }
    }

    /// Record that `mac` was last seen on `port` of `device`
    ///
    /// Returns the previously recorded port, if any.
    pub fn learn(&self, device: &DeviceId, mac: MacAddr, port: PortNumber) -> Option<PortNumber> {
        if let Some(table) = self.devices.get(device) {
            return table.put(mac, port);
        }
        // entry() holds the shard write lock, so the sub-table is built once
        self.devices
            .entry(device.clone())
            .or_insert_with(|| KeyedTable::new(self.max_age))
            .put(mac, port)
    }

    pub fn lookup(&self, device: &DeviceId, mac: &MacAddr) -> Option<PortNumber> {
        self.devices.get(device)?.get(mac)
    }

    pub fn contains(&self, device: &DeviceId, mac: &MacAddr) -> bool {
        self.lookup(device, mac).is_some()
    }

    /// Number of devices with a sub-table
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Total entries across all devices
    pub fn len(&self) -> usize {
        self.devices.iter().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn age_out(&self) -> usize {
        self.devices.iter().map(|t| t.age_out()).sum()
    }
}
