mod config;
mod telemetry;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError, LoggingConfig};
use std::net::IpAddr;
use std::path::PathBuf;
use telemetry::TelemetryError;
use tracker_protocol::{BuildError, RawParams, RequestContext, build_event_from_mapped_params};

#[derive(Parser)]
#[command(version, about = "Tracker-protocol event collector")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the HTTP collector
    Collector(CollectorArgs),
    /// Build the envelope for one tracker query string and print it as JSON
    Decode(DecodeArgs),
}

#[derive(Args)]
struct CollectorArgs {
    #[arg(long)]
    config: PathBuf,
}

#[derive(Args)]
struct DecodeArgs {
    /// Query string such as `e=pv&aid=shop`, optionally with a leading `?`
    /// or a full pixel URL
    query: String,
    /// Client address used when the query has no `ip` parameter
    #[arg(long)]
    ip: Option<IpAddr>,
    /// Treat the beacon as sent with the anonymous tracking header
    #[arg(long)]
    anonymous: bool,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Collector(#[from] collector::CollectorError),

    #[error("could not build event: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Collector(args) => run_collector(args),
        CliCommand::Decode(args) => decode(args),
    }
}

fn run_collector(args: CollectorArgs) -> Result<(), CliError> {
    let config = Config::from_file(&args.config)?;

    let logging = config.common.logging.clone().unwrap_or_default();
    let _guard = telemetry::init_logging(&logging)?;
    if let Some(metrics) = &config.common.metrics {
        telemetry::init_metrics(metrics)?;
    }

    tracing::info!(config = %args.config.display(), "starting beacon");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(collector::run(config.collector))?;
    Ok(())
}

fn decode(args: DecodeArgs) -> Result<(), CliError> {
    let _guard = telemetry::init_logging(&LoggingConfig {
        level: "warn".into(),
        ..Default::default()
    })?;

    let params = RawParams::from_query(query_part(&args.query));
    let ctx = RequestContext {
        ip: args.ip,
        anonymous: args.anonymous,
        ..Default::default()
    };
    let envelope = build_event_from_mapped_params(&params, &ctx)?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn query_part(input: &str) -> &str {
    match input.split_once('?') {
        Some((_, query)) => query,
        None => input,
    }
}
