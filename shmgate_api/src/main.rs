//! # shmgate
//!
//! HTTP gateway for System V shared memory segments.
//!
//! # Usage
//!
//! ```bash
//! # Kernel backend on the default address (0.0.0.0:50000)
//! shmgate
//!
//! # Config file, custom address
//! shmgate --config /etc/shmgate/shmgate.toml --listen 127.0.0.1:8080
//!
//! # In-process simulated backend, verbose JSON logs
//! shmgate -s -v --json
//! ```

use clap::Parser;
use shmgate::prelude::*;
use shmgate_api::{ApiConfig, select_bridge, serve};
use shmgate_segment::SegmentRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// shmgate - System V shared memory over HTTP
#[derive(Parser, Debug)]
#[command(name = "shmgate")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "HTTP gateway for System V shared memory segment lifecycle operations")]
#[command(long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    /// Defaults to /etc/shmgate/shmgate.toml when that file exists.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.listen`
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Use the in-process simulated backend instead of the kernel
    #[arg(short = 's', long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("shmgate failed: {}", e);
        eprintln!("shmgate failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(listen) = &args.listen {
        config.server.listen = listen.clone();
    }
    config.backend.simulate |= args.simulate;
    let addr = config.validate()?;

    setup_tracing(&args, config.shared.log_level);
    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let registry = Arc::new(SegmentRegistry::new(select_bridge(config.backend.simulate)));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, registry, shutdown_signal()).await
    })?;

    info!("shmgate shutdown complete");
    Ok(())
}

/// Explicit path must exist; the default path is optional.
fn load_config(path: Option<&Path>) -> Result<ApiConfig, ConfigError> {
    match path {
        Some(path) => ApiConfig::load(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                ApiConfig::load(default)
            } else {
                Ok(ApiConfig::default())
            }
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
