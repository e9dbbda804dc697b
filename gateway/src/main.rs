use clap::Parser;
use dashboard::api::{self, AppState};
use dashboard::auth::{CredentialGate, InMemorySessionStore};
use dashboard::client::Backend;
use metrics_exporter_statsd::StatsdBuilder;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, MetricsConfig};

#[derive(Parser)]
#[command(about = "Aggregation gateway for the anomaly dashboard")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_file(&cli.config)?;

    // The guard must outlive the runtime so shutdown flushes pending events.
    let _sentry_guard = config.logging.as_ref().map(|logging| {
        sentry::init((
            logging.sentry_dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    if let Some(metrics_config) = &config.metrics {
        init_metrics(metrics_config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let backend = Backend::new(
        config.backend_api.base_url.clone(),
        Duration::from_secs(config.backend_api.timeout_secs),
    )?;

    // Session creation is owned by the login flow, not by this gateway; a
    // real deployment wires its session backend in here.
    let store = Arc::new(InMemorySessionStore::new());
    let state = AppState {
        gate: CredentialGate::new(store),
        backend,
    };

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        backend = %config.backend_api.base_url,
        "starting dashboard gateway"
    );
    api::serve(&config.listener.host, config.listener.port, state).await?;
    Ok(())
}

fn init_metrics(config: &MetricsConfig) -> Result<(), Box<dyn Error>> {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some("dashboard_gateway"))?;
    metrics::set_global_recorder(recorder)
        .map_err(|e| format!("failed to install metrics recorder: {e}"))?;
    Ok(())
}
