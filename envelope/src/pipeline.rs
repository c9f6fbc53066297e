use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an event came from and when it passed through the collector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub source: Source,
    pub collector: Collector,
}

/// Tracker-reported timing and identity. Every field is client supplied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_tstamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_tstamp: Option<DateTime<Utc>>,
    /// Tracker namespace (`tna`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tracker version (`tv`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Collector-assigned fields. `tstamp` is never taken from client input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collector {
    pub tstamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
