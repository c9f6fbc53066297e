//! Schema registry used to validate self-describing payloads and contexts.
//!
//! Schemas are addressed by Iglu URI (`iglu:vendor/name/format/version`),
//! read from a [`SchemaCacheBackend`] and kept compiled in a bounded cache.

mod backend;
pub mod config;
pub mod metrics_defs;
mod registry;

pub use backend::{BackendError, FilesystemBackend, SchemaCacheBackend};
pub use registry::{Registry, RegistryError};
