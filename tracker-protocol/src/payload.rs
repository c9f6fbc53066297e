//! Decoders for the self-describing payloads trackers embed in string
//! parameters, either base64 encoded (`ue_px`, `cx`) or as plain JSON
//! (`ue_pr`, `co`).
//!
//! Both kinds are wrapped in an outer self-describing object:
//!
//! ```json
//! {"schema": "iglu:.../unstruct_event/jsonschema/1-0-0",
//!  "data": {"schema": "iglu:com.acme/click/jsonschema/1-0-0", "data": {...}}}
//!
//! {"schema": "iglu:.../contexts/jsonschema/1-0-0",
//!  "data": [{"schema": "...", "data": {...}}, ...]}
//! ```

use crate::errors::DecodeError;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine as _, alphabet};
use envelope::{Contexts, SelfDescribingPayload};
use serde_json::Value;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

// Browser trackers encode with the URL-safe alphabet.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadEncoding {
    Base64,
    Json,
}

/// Decodes a base64 parameter. Padding is optional.
pub fn decode_b64_param(raw: &str) -> Result<Vec<u8>, DecodeError> {
    let raw = raw.trim();
    match STANDARD_LENIENT.decode(raw) {
        Ok(bytes) => Ok(bytes),
        Err(err) => URL_SAFE_LENIENT.decode(raw).map_err(|_| err.into()),
    }
}

/// The self-describing event carried in a base64 parameter, or `None` if it
/// cannot be decoded.
pub fn get_sd_payload(raw: &str) -> Option<SelfDescribingPayload> {
    try_sd_payload(raw, PayloadEncoding::Base64).ok().flatten()
}

/// The contexts carried in a base64 parameter, or `None` if absent or not
/// decodable. An empty context array is an empty, present set.
pub fn get_contexts(raw: &str) -> Option<Contexts> {
    try_contexts(raw, PayloadEncoding::Base64).ok().flatten()
}

/// Like [`get_sd_payload`] but reports why decoding failed. Empty input is
/// `Ok(None)`.
pub fn try_sd_payload(
    raw: &str,
    encoding: PayloadEncoding,
) -> Result<Option<SelfDescribingPayload>, DecodeError> {
    let Some(outer) = decode_json(raw, encoding)? else {
        return Ok(None);
    };
    let inner = take_data(outer)?;
    to_payload(inner).map(Some)
}

/// Like [`get_contexts`] but reports why decoding failed. Empty input is
/// `Ok(None)`.
pub fn try_contexts(raw: &str, encoding: PayloadEncoding) -> Result<Option<Contexts>, DecodeError> {
    let Some(outer) = decode_json(raw, encoding)? else {
        return Ok(None);
    };
    let Value::Array(elements) = take_data(outer)? else {
        return Err(DecodeError::Shape("context data must be an array".into()));
    };

    let mut contexts = Contexts::with_capacity(elements.len());
    for element in elements {
        let payload = to_payload(element)?;
        // Later entries for the same schema replace earlier ones.
        contexts.insert(payload.schema, payload.data);
    }
    Ok(Some(contexts))
}

fn decode_json(raw: &str, encoding: PayloadEncoding) -> Result<Option<Value>, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let value = match encoding {
        PayloadEncoding::Base64 => serde_json::from_slice(&decode_b64_param(raw)?)?,
        PayloadEncoding::Json => serde_json::from_str(raw)?,
    };
    Ok(Some(value))
}

fn take_data(value: Value) -> Result<Value, DecodeError> {
    match value {
        Value::Object(mut object) => object
            .remove("data")
            .ok_or_else(|| DecodeError::Shape("missing data".into())),
        _ => Err(DecodeError::Shape("expected a JSON object".into())),
    }
}

fn to_payload(value: Value) -> Result<SelfDescribingPayload, DecodeError> {
    let Value::Object(mut object) = value else {
        return Err(DecodeError::Shape("expected a self-describing object".into()));
    };
    let schema = match object.remove("schema") {
        Some(Value::String(schema)) if !schema.is_empty() => schema,
        _ => return Err(DecodeError::Shape("missing schema".into())),
    };
    let data = match object.remove("data") {
        Some(Value::Object(data)) => data,
        _ => return Err(DecodeError::Shape(format!("data of {schema} must be an object"))),
    };
    Ok(SelfDescribingPayload { schema, data })
}
