use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Schema URI to context data. Keys are unique by construction.
pub type Contexts = HashMap<String, Map<String, Value>>;

/// A blob that names the schema it conforms to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribingPayload {
    pub schema: String,
    pub data: Map<String, Value>,
}

impl SelfDescribingPayload {
    /// `vendor.name` for an Iglu URI such as
    /// `iglu:com.acme/viewed_product/jsonschema/1-0-0`.
    pub fn namespace(&self) -> Option<String> {
        let path = self.schema.strip_prefix("iglu:")?;
        let mut parts = path.split('/');
        let vendor = parts.next().filter(|v| !v.is_empty())?;
        let name = parts.next().filter(|n| !n.is_empty())?;
        Some(format!("{vendor}.{name}"))
    }
}

/// The mutually exclusive event shapes of the tracker protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PageView,
    PagePing(PagePing),
    Struct(StructEvent),
    Transaction(Transaction),
    TransactionItem(TransactionItem),
    SelfDescribing(SelfDescribingEvent),
}

impl Event {
    pub const fn name(&self) -> &'static str {
        match self {
            Event::PageView => "page_view",
            Event::PagePing(_) => "page_ping",
            Event::Struct(_) => "struct",
            Event::Transaction(_) => "transaction",
            Event::TransactionItem(_) => "transaction_item",
            Event::SelfDescribing(_) => "self_describing",
        }
    }

    /// Event namespace recorded in the event metadata. Self-describing events
    /// are named after their schema; everything else after its shape.
    pub fn namespace(&self) -> String {
        match self {
            Event::SelfDescribing(SelfDescribingEvent {
                payload: Some(payload),
            }) => payload
                .namespace()
                .unwrap_or_else(|| self.name().to_string()),
            _ => self.name().to_string(),
        }
    }
}

/// Scroll bounds reported since the last ping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_x_offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_x_offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_y_offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_y_offset: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A custom event. The payload is absent when the client sent the `ue`
/// discriminator without a decodable payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribingEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<SelfDescribingPayload>,
}
