use serde_json::{Map, Value};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("{0}")]
    Invalid(String),
}

/// Checks self-describing data against its schema.
///
/// Implementations may keep their own cache; the builder treats every call as
/// an independent, side-effect free lookup.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, schema: &str, data: &Map<String, Value>) -> Result<(), ValidationError>;
}
