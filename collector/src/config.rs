use registry::config::{BackendConfig, RegistryConfig};
use serde::Deserialize;
use thiserror::Error;
use tracker_protocol::AnonymizationPolicy;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Listener and admin listener cannot share {0}")]
    ListenerConflict(String),

    #[error("Collector name cannot be empty")]
    EmptyCollectorName,

    #[error("ip_octets must be between 0 and 4, got {0}")]
    InvalidIpOctets(u8),

    #[error("ipv6_segments must be between 0 and 8, got {0}")]
    InvalidIpv6Segments(u8),

    #[error("Schema registry path cannot be empty")]
    EmptyRegistryPath,

    #[error("max_body_bytes cannot be 0")]
    InvalidBodyLimit,
}

/// Collector configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for tracker traffic
    pub listener: Listener,
    /// Listener for health, readiness and stats
    pub admin_listener: Listener,
    /// Identity stamped on every envelope
    #[serde(default)]
    pub collector: CollectorSettings,
    #[serde(default)]
    pub anonymization: AnonymizationPolicy,
    /// Validate self-describing payloads and contexts when set
    pub registry: Option<RegistryConfig>,
    #[serde(default)]
    pub sink: SinkConfig,
    /// Upper bound on POST bodies
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        if self.listener == self.admin_listener {
            return Err(ValidationError::ListenerConflict(format!(
                "{}:{}",
                self.listener.host, self.listener.port
            )));
        }

        if self.collector.name.trim().is_empty() {
            return Err(ValidationError::EmptyCollectorName);
        }

        if self.anonymization.ip_octets > 4 {
            return Err(ValidationError::InvalidIpOctets(self.anonymization.ip_octets));
        }
        if self.anonymization.ipv6_segments > 8 {
            return Err(ValidationError::InvalidIpv6Segments(
                self.anonymization.ipv6_segments,
            ));
        }

        if let Some(registry) = &self.registry {
            let BackendConfig::Filesystem { path } = &registry.backend;
            if path.is_empty() {
                return Err(ValidationError::EmptyRegistryPath);
            }
        }

        if self.max_body_bytes == 0 {
            return Err(ValidationError::InvalidBodyLimit);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CollectorSettings {
    #[serde(default = "default_collector_name")]
    pub name: String,
    #[serde(default = "default_collector_version")]
    pub version: String,
}

fn default_collector_name() -> String {
    "beacon".into()
}

fn default_collector_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

impl Default for CollectorSettings {
    fn default() -> Self {
        CollectorSettings {
            name: default_collector_name(),
            version: default_collector_version(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum SinkConfig {
    #[default]
    Stdout,
}
