use clap::Parser;
use dres_domain::CliOverrides;
use dres_infrastructure::dns::{DnsServerHandler, RoutingEngineBuilder};
use std::sync::Arc;
use tracing::{error, info};

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "dres")]
#[command(version)]
#[command(about = "dres - split-horizon DNS router")]
struct Cli {
    /// Configuration file path (JSON, or TOML with a .toml extension)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    info!("Starting dres v{}", env!("CARGO_PKG_VERSION"));

    let engine = RoutingEngineBuilder::new(&config).build()?;
    let handler = DnsServerHandler::new(Arc::new(engine));

    tokio::select! {
        result = server::start_dns_server(&config.server, handler) => {
            if let Err(e) = result {
                error!(error = %e, "DNS server error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
