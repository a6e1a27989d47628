use agentreg_api::{create_app, metrics::run_metrics_server, AppState, ServiceConfig};
use agentreg_ledger::{LedgerStorage, ReputationService, SledStorage};
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the service configuration file.
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Override the configured listen address.
    #[clap(long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    let log_level_str = config.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level_str))
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    info!("Starting agent registry service...");

    let service = match &config.storage_path {
        Some(path) => {
            info!("Storage Path: {:?}", path);
            let storage: Arc<dyn LedgerStorage> = Arc::new(
                SledStorage::open(path).context("Failed to initialize SledStorage")?,
            );
            ReputationService::new(storage).context("Failed to load agent ledger")?
        }
        None => {
            info!("No storage_path configured; ledger is in memory only");
            ReputationService::in_memory()
        }
    };
    let state = AppState::new(service, config.event_buffer);
    info!(
        total_agents = state.service.get_total_agents()?,
        "agent ledger ready"
    );

    if let Some(metrics_addr) = config.metrics_addr {
        tokio::spawn(run_metrics_server(metrics_addr));
    }

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("listening on {}", config.listen_addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
