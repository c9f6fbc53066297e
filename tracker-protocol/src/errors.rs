use thiserror::Error;

/// Result type alias for event builds
pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// A structural payload could not be decoded. Unlike a bad scalar parameter,
/// this means the request as a whole cannot be trusted.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    Shape(String),

    #[error("invalid dimension string: {0:?}")]
    Dimension(String),
}

/// Reasons a beacon is rejected as a whole. These route the request to the
/// invalid-event path.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("could not decode {param}: {source}")]
    Decode {
        param: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("missing event type parameter")]
    MissingEventType,

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("schema validation failed for {schema}: {reason}")]
    SchemaValidationFailed { schema: String, reason: String },
}

impl BuildError {
    pub(crate) fn decode(param: &'static str) -> impl FnOnce(DecodeError) -> BuildError {
        move |source| BuildError::Decode { param, source }
    }

    /// Short machine-readable label, used for stats and metric tags.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::Decode { .. } => "decode_error",
            BuildError::MissingEventType => "missing_event_type",
            BuildError::UnknownEventType(_) => "unknown_event_type",
            BuildError::SchemaValidationFailed { .. } => "schema_validation_failed",
        }
    }
}
