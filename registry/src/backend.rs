//! Cache backends hold the raw schema documents the registry validates
//! against. The registry only ever reads from them.
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

const IGLU_PREFIX: &str = "iglu:";

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid schema URI: {0}")]
    InvalidUri(String),
}

pub trait SchemaCacheBackend: Send + Sync {
    fn fetch(&self, schema: &str) -> Result<Vec<u8>, BackendError>;
}

/// Schemas laid out on disk as `<root>/<vendor>/<name>/<format>/<version>`.
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FilesystemBackend { root: root.into() }
    }

    fn schema_path(&self, schema: &str) -> Result<PathBuf, BackendError> {
        let invalid = || BackendError::InvalidUri(schema.to_string());

        let relative = Path::new(schema.strip_prefix(IGLU_PREFIX).ok_or_else(invalid)?);
        let mut depth = 0;
        for component in relative.components() {
            // Only plain names, so a URI cannot escape the root
            let Component::Normal(_) = component else {
                return Err(invalid());
            };
            depth += 1;
        }
        if depth != 4 {
            return Err(invalid());
        }
        Ok(self.root.join(relative))
    }
}

impl SchemaCacheBackend for FilesystemBackend {
    fn fetch(&self, schema: &str) -> Result<Vec<u8>, BackendError> {
        let path = self.schema_path(schema)?;
        fs::read(&path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "could not read schema");
            BackendError::Io(e)
        })
    }
}
