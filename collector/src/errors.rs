use crate::config::ValidationError;
use crate::sink::SinkError;
use thiserror::Error;

/// Result type alias for collector operations
pub type Result<T, E = CollectorError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hyper error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}
