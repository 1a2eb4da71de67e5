//! Envprobe Binary Entry Point
//!
//! This binary runs the envprobe admin service. Core functionality is
//! provided by the `envprobe` library crate.

use std::net::SocketAddr;
use std::path::Path;

use clap::Parser;
use envprobe::{
    config::AppConfig,
    infra::InfrastructureInfo,
    probe::ProbeRunner,
    server::{AppState, create_router},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Envprobe - Environment Connectivity Validator
#[derive(Parser, Debug)]
#[command(name = "envprobe", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "ENVPROBE_CONFIG"
    )]
    config: String,

    /// Server bind address (overrides config file)
    #[arg(long, env = "ENVPROBE_SERVER_BIND")]
    server_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "ENVPROBE_SERVER_PORT")]
    server_port: Option<u16>,

    /// Infrastructure metadata file (overrides config file)
    #[arg(long, env = "ENVPROBE_INFRASTRUCTURE_FILE")]
    infrastructure_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,envprobe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Envprobe - Environment Connectivity Validator");

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file
    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load_or_default(&cli.config)?;

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(bind) = cli.server_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.server_port {
        config.server.port = port;
    }
    if let Some(path) = cli.infrastructure_file {
        config.infrastructure_file = Some(path);
    }
    config.validate()?;

    tracing::info!(
        "Server: {}:{}, probe defaults: {} probes, {:?} timeout",
        config.server.bind,
        config.server.port,
        config.probe.count,
        config.probe.timeout,
    );

    // Load infrastructure metadata once; the service runs without it, so a
    // missing or broken file degrades to "no fallback target".
    let infrastructure = load_infrastructure(config.infrastructure_file.as_deref());

    // Build application state
    let app_state = AppState {
        runner: ProbeRunner::new(),
        probe_defaults: config.probe.clone(),
        infrastructure,
    };

    // Build Axum router
    let app = create_router(app_state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Read the infrastructure metadata file, when configured and present.
fn load_infrastructure(path: Option<&str>) -> Option<InfrastructureInfo> {
    let path = path?;
    if !Path::new(path).exists() {
        tracing::warn!(path = %path, "Infrastructure metadata file not found");
        return None;
    }
    match InfrastructureInfo::load(path) {
        Ok(info) => {
            tracing::info!(path = %path, "Loaded infrastructure metadata");
            Some(info)
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to load infrastructure metadata");
            None
        }
    }
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
