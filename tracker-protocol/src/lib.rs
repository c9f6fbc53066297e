//! Decoder and event builder for the tracker wire protocol.
//!
//! Trackers send a flat map of short string keys (`e`, `aid`, `ue_px`, ...)
//! either as a GET query string or as one element of a POST `data` array.
//! [`EventBuilder`] turns one such map, plus what the collector knows about
//! the HTTP request, into an [`envelope::Envelope`].
//!
//! Scalar parameters are forgiving: a value that does not parse is treated as
//! absent. Structural parameters (event type, dimensions, base64 and JSON
//! payloads) fail the whole build with a [`BuildError`].

mod anonymize;
mod builder;
mod errors;
mod fields;
mod geometry;
mod params;
mod payload;
pub mod protocol;
mod referer;
mod validation;

#[cfg(test)]
mod testutils;

pub use anonymize::{AnonymizationPolicy, anonymize_fields, anonymize_params, mask_ip};
pub use builder::{EventBuilder, RequestContext, build_event_from_mapped_params};
pub use errors::{BuildError, DecodeError, Result};
pub use fields::{
    CollectorIdentity, Dimensions, EventMetadata, Metadata, browser_fields, contexts_fields,
    dimension_fields, event_metadata_fields, metadata_fields, page_fields, page_ping_fields,
    referrer_fields, self_describing_fields, struct_fields, transaction_fields,
    transaction_item_fields, user_fields,
};
pub use geometry::{get_dimensions, get_query_param};
pub use params::RawParams;
pub use payload::{
    PayloadEncoding, decode_b64_param, get_contexts, get_sd_payload, try_contexts, try_sd_payload,
};
pub use protocol::EventType;
pub use referer::classify as classify_referrer;
pub use validation::{SchemaValidator, ValidationError};
