use crate::backend::{BackendError, FilesystemBackend, SchemaCacheBackend};
use crate::config::{BackendConfig, CacheConfig, RegistryConfig};
use crate::metrics_defs::{SCHEMA_CACHE_HIT, SCHEMA_CACHE_MISS, SCHEMA_FETCH_ERROR};
use jsonschema::Validator;
use moka::sync::Cache;
use serde_json::{Map, Value};
use shared::counter;
use std::sync::Arc;
use std::time::Duration;
use tracker_protocol::{SchemaValidator, ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema does not compile: {0}")]
    Compile(String),
}

/// Compiled schemas in front of a cache backend.
pub struct Registry {
    backend: Arc<dyn SchemaCacheBackend>,
    cache: Cache<String, Arc<Validator>>,
}

impl Registry {
    pub fn new(backend: Arc<dyn SchemaCacheBackend>, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Registry { backend, cache }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        let backend: Arc<dyn SchemaCacheBackend> = match &config.backend {
            BackendConfig::Filesystem { path } => Arc::new(FilesystemBackend::new(path)),
        };
        tracing::info!(backend = ?config.backend, "schema registry initialized");
        Registry::new(backend, &config.cache)
    }

    /// Returns the compiled validator for `schema`, reading through to the
    /// backend on a cache miss. Failures are not cached.
    pub fn get(&self, schema: &str) -> Result<Arc<Validator>, RegistryError> {
        if let Some(validator) = self.cache.get(schema) {
            counter!(SCHEMA_CACHE_HIT).increment(1);
            return Ok(validator);
        }
        counter!(SCHEMA_CACHE_MISS).increment(1);

        let validator = self
            .fetch_and_compile(schema)
            .inspect_err(|e| {
                counter!(SCHEMA_FETCH_ERROR).increment(1);
                tracing::warn!(schema, error = %e, "schema lookup failed");
            })?;

        let validator = Arc::new(validator);
        self.cache.insert(schema.to_string(), validator.clone());
        Ok(validator)
    }

    fn fetch_and_compile(&self, schema: &str) -> Result<Validator, RegistryError> {
        let bytes = self.backend.fetch(schema)?;
        let document: Value = serde_json::from_slice(&bytes)?;
        jsonschema::options()
            .build(&document)
            .map_err(|e| RegistryError::Compile(e.to_string()))
    }
}

impl SchemaValidator for Registry {
    fn validate(&self, schema: &str, data: &Map<String, Value>) -> Result<(), ValidationError> {
        let validator = self
            .get(schema)
            .map_err(|e| ValidationError::SchemaUnavailable(e.to_string()))?;

        let instance = Value::Object(data.clone());
        let errors: Vec<String> = validator
            .iter_errors(&instance)
            .map(|error| error.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(errors.join("; ")))
        }
    }
}
