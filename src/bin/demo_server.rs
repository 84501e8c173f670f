//! demo-server: a login endpoint with an injected timing leak.
//!
//! # Usage
//!
//! ```bash
//! demo-server --port 3001 --base-latency 5 --stddev 1
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use http_timing_oracle::demo::{self, DemoConfig};

#[derive(Parser, Debug)]
#[command(name = "demo-server")]
#[command(version, about = "Login endpoint with an injected timing leak", long_about = None)]
struct Args {
    /// Interface to bind
    #[arg(long, env = "DEMO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "DEMO_PORT", default_value_t = 3001)]
    port: u16,

    /// Noise standard deviation in milliseconds
    #[arg(long, env = "DEMO_STDDEV", default_value_t = 0.0)]
    stddev: f64,

    /// Mean noise latency in milliseconds
    #[arg(long, alias = "baseLatency", env = "DEMO_BASE_LATENCY", default_value_t = 0.0)]
    base_latency: f64,

    /// Enable debug logging
    #[arg(long, env = "DEMO_DEBUG")]
    debug: bool,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    let addr: SocketAddr = match format!("{}:{}", args.host, args.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(host = %args.host, port = args.port, error = %e, "invalid listen address");
            return ExitCode::FAILURE;
        }
    };
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let config = DemoConfig::default()
        .base_latency_ms(args.base_latency)
        .std_dev_ms(args.stddev);
    match demo::serve(listener, config, shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server error");
            ExitCode::FAILURE
        }
    }
}
