//! Blog public front controller.
//!
//! ```text
//!     Client ──▶ axum (timeout, request id, trace) ──▶ Front::handle
//!                                                        │
//!                          route table ◀─────────────────┤
//!                          content handlers ◀────────────┤
//!                          document server ◀─────────────┘
//!                                │
//!     Client ◀── response ◀──────┘ (304 / 200 / 302 / 404 / 412)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use blog_front::config::{load_config, FrontConfig};
use blog_front::lifecycle::{boot, Shutdown};
use blog_front::observability::{logging, metrics};
use blog_front::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "blog-front", version, about = "Public front controller of a blog")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FrontConfig::default(),
    };
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "blog-front starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        site_url = %config.site.url,
        theme = %config.theme.name,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                let handle = metrics::init_metrics()?;
                metrics::start_metrics_server(addr, handle, shutdown.subscribe()).await?;
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let front = boot(&config, cli.config.as_deref())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let mut server = HttpServer::new(&config, front);
    if let Some(path) = cli.config {
        server = server.with_config_path(path);
    }
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}
