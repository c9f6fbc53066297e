//! HTTP collector for tracker beacons.
//!
//! Accepts GET pixel requests and batched POSTs, builds each event with
//! [`tracker_protocol::EventBuilder`] and publishes valid and invalid events
//! to the configured [`sink::Sink`].

pub mod config;
mod errors;
pub mod metrics_defs;
mod service;
pub mod sink;
mod stats;

pub use errors::{CollectorError, Result};
pub use service::{
    CollectorService, CollectorState, PIXEL_PATH, TRACKER_PIXEL_PATH, TRACKER_POST_PATH,
};
pub use stats::{ProtocolStats, StatsSnapshot};

use config::{Config, SinkConfig};
use registry::Registry;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use sink::{Sink, StdoutSink};
use std::sync::Arc;
use tracker_protocol::{CollectorIdentity, EventBuilder};

pub fn event_builder(config: &Config) -> EventBuilder {
    let identity = CollectorIdentity {
        name: Some(config.collector.name.clone()),
        version: Some(config.collector.version.clone()),
    };
    let builder = EventBuilder::new(identity).with_anonymization(config.anonymization.clone());
    match &config.registry {
        Some(registry) => builder.with_validator(Arc::new(Registry::from_config(registry))),
        None => builder,
    }
}

pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);
    shared::metrics_defs::describe_all(registry::metrics_defs::ALL_METRICS);

    let sink: Arc<dyn Sink> = match config.sink {
        SinkConfig::Stdout => Arc::new(StdoutSink::stdout()),
    };
    let stats = Arc::new(ProtocolStats::new());
    let state = Arc::new(CollectorState::new(
        event_builder(&config),
        sink,
        stats.clone(),
        config.max_body_bytes,
    ));

    let admin_service: AdminService<_, CollectorError> =
        AdminService::new(|| true).with_stats(move || stats.to_json());

    tracing::info!(
        collector = %config.collector.name,
        version = %config.collector.version,
        "starting collector"
    );

    let collector_task = run_http_service(&config.listener.host, config.listener.port, |peer| {
        CollectorService::new(state.clone(), peer)
    });
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        |_| admin_service.clone(),
    );

    tokio::try_join!(collector_task, admin_task)?;
    Ok(())
}
