//! Per-app counters.
//!
//! Counters are relaxed atomics; handlers on different workers bump them
//! without coordination and readers only need a rough snapshot.

use crate::dataplane::DropReason;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drop counts, one per reason
#[derive(Debug, Default)]
pub struct DropStats {
    pub not_parseable: Counter,
    pub not_relevant: Counter,
    pub missing_dependency: Counter,
    pub already_handled: Counter,
}

impl DropStats {
    fn counter(&self, reason: DropReason) -> &Counter {
        match reason {
            DropReason::NotParseable => &self.not_parseable,
            DropReason::NotRelevant => &self.not_relevant,
            DropReason::MissingDependency(_) => &self.missing_dependency,
            DropReason::AlreadyHandled => &self.already_handled,
        }
    }

    pub fn total(&self) -> u64 {
        self.not_parseable.get()
            + self.not_relevant.get()
            + self.missing_dependency.get()
            + self.already_handled.get()
    }
}

/// What one app did since activation
#[derive(Debug, Default)]
pub struct AppStats {
    /// Packet-in events delivered to the app
    pub packets_seen: Counter,
    /// Network-config events delivered to the app
    pub config_events: Counter,
    pub floods: Counter,
    pub rules_installed: Counter,
    /// Frames sent out a specific port, including synthesized ones
    pub packets_emitted: Counter,
    pub intents_submitted: Counter,
    pub arp_replies: Counter,
    pub drops: DropStats,
}

impl AppStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drop(&self, reason: DropReason) {
        self.drops.counter(reason).inc();
    }

    pub fn drops_for(&self, reason: DropReason) -> u64 {
        self.drops.counter(reason).get()
    }

    /// Name/value pairs in a fixed order, for the replay summary.
    pub fn export(&self) -> Vec<(String, u64)> {
        let mut result: Vec<(String, u64)> = vec![
            ("packets_seen".into(), self.packets_seen.get()),
            ("config_events".into(), self.config_events.get()),
            ("floods".into(), self.floods.get()),
            ("rules_installed".into(), self.rules_installed.get()),
            ("packets_emitted".into(), self.packets_emitted.get()),
            ("intents_submitted".into(), self.intents_submitted.get()),
            ("arp_replies".into(), self.arp_replies.get()),
        ];
        for reason in [
            DropReason::NotParseable,
            DropReason::NotRelevant,
            DropReason::AlreadyHandled,
        ] {
            result.push((format!("drops_{}", reason.label()), self.drops_for(reason)));
        }
        result.push((
            "drops_missing_dependency".into(),
            self.drops.missing_dependency.get(),
        ));
        result
    }
}
