//! procmux server binary.
//!
//! ```text
//!     Client request ──▶ user server ──▶ Multiplexer ──▶ Dispatcher
//!                                                         │ register handler
//!                                                         ▼
//!                                                   spawned process
//!                                                         │ reads request,
//!                                                         │ writes response
//!                                                         ▼
//!                                                   control API
//!
//!     procmux-cli ──▶ admin API ──▶ RouteService (table → rebuild → publish)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use procmux::config::{load_config, ServerConfig};
use procmux::lifecycle::{signals, App, Shutdown};
use procmux::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "procmux")]
#[command(about = "Serve HTTP requests by spawning processes", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "procmux starting");

    tracing::info!(
        user = %config.user.bind_address,
        control = %config.control.bind_address,
        admin = %config.admin.bind_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = App::new(config)?;
    let shutdown = Arc::new(Shutdown::new());

    let signal_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { signals::forward_signals(&shutdown).await })
    };

    app.run(&shutdown).await?;
    signal_task.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
