//! Canonical representation of one tracking event.
//!
//! An [`Envelope`] is built once per accepted beacon and handed to the sinks.
//! Optional fields are `Option`s that are left out of the JSON form entirely,
//! so a partial client payload never shows up as fabricated `null`s.

mod event;
mod pipeline;
mod sections;

pub use event::{
    Contexts, Event, PagePing, SelfDescribingEvent, SelfDescribingPayload, StructEvent,
    Transaction, TransactionItem,
};
pub use pipeline::{Collector, Pipeline, Source};
pub use sections::{
    Browser, BrowserFeatures, Campaign, Dimension, EventMeta, Page, Platform, Referrer,
    ReferrerMedium, UnknownPlatform, UrlParts, User,
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub pipeline: Pipeline,
    pub event_meta: EventMeta,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub browser: Browser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<Referrer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Contexts>,
    pub event: Event,
}

impl Envelope {
    /// The envelope as a JSON object, for sinks that reshape properties.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Newline-terminated JSON, for line-oriented sinks.
    pub fn to_json_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
