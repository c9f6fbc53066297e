//! In-process event counters, served as JSON on the admin listener.

use crate::metrics_defs::{EVENTS_INVALID, EVENTS_VALID};
use parking_lot::Mutex;
use serde::Serialize;
use shared::counter;
use std::collections::BTreeMap;

type Family = BTreeMap<&'static str, BTreeMap<&'static str, u64>>;

/// Valid and invalid event counts keyed by protocol, then event type.
///
/// Each family has its own lock; the read-modify-write happens entirely
/// under it.
#[derive(Default)]
pub struct ProtocolStats {
    valid: Mutex<Family>,
    invalid: Mutex<Family>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub valid: Family,
    pub invalid: Family,
}

impl ProtocolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_valid(&self, protocol: &'static str, event: &'static str, count: u64) {
        increment(&self.valid, protocol, event, count);
        counter!(EVENTS_VALID, "protocol" => protocol, "event_type" => event).increment(count);
    }

    pub fn increment_invalid(&self, protocol: &'static str, event: &'static str, count: u64) {
        increment(&self.invalid, protocol, event, count);
        counter!(EVENTS_INVALID, "protocol" => protocol, "event_type" => event).increment(count);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            valid: self.valid.lock().clone(),
            invalid: self.invalid.lock().clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        // A map of maps of integers always serializes
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

fn increment(family: &Mutex<Family>, protocol: &'static str, event: &'static str, count: u64) {
    let mut family = family.lock();
    *family
        .entry(protocol)
        .or_default()
        .entry(event)
        .or_default() += count;
}
