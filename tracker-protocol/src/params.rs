//! Typed accessors over the untyped wire parameters.
//!
//! Clients are untrusted, so every accessor returns `None` both for a missing
//! key and for a value that does not coerce to the requested type. One corrupt
//! field costs that field only, never the whole event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// The parameters of one beacon, keyed by protocol short code.
///
/// Built once per request by the transport. Only redaction of rejected
/// beacons mutates it afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParams(HashMap<String, Value>);

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query string. Repeated
    /// keys keep the last value.
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect()
    }

    pub fn from_json_object(object: Map<String, Value>) -> Self {
        RawParams(object.into_iter().collect())
    }

    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text form of a scalar value. Objects, arrays and nulls have none.
    pub fn get_str(&self, key: &str) -> Option<Cow<'_, str>> {
        let text = match self.0.get(key)? {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_str(key).map(Cow::into_owned)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_str(key)?.trim().parse().ok()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_str(key)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        parse_bool(&self.get_str(key)?)
    }

    /// Epoch milliseconds as a UTC instant.
    pub fn get_time(&self, key: &str) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.get_i64(key)?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawParams(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// Same vocabulary as Go's strconv.ParseBool, which covers the protocol's
// "1"/"0" flags as well as "true"/"false".
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
