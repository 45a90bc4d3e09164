use clap::Parser;
use splitdns_domain::{CliOverrides, RoutingTable};
use splitdns_infrastructure::dns::QueryEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "splitdns")]
#[command(version)]
#[command(about = "Suffix-routing DNS forwarder with ordered recursive fallback")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (host:port), used for both UDP and TCP
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        listen: cli.listen,
        log_level: cli.log_level,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!("starting splitdns v{}", env!("CARGO_PKG_VERSION"));

    let table = Arc::new(RoutingTable::from_config(&config)?);
    info!(
        listen = %table.listen(),
        forwarders = table.rules().len(),
        recursors = table.recursors().len(),
        "routing table loaded"
    );

    let engine = Arc::new(QueryEngine::new(
        table.clone(),
        Duration::from_millis(config.upstream.exchange_timeout_ms),
    ));

    let udp = server::run_udp_listener(engine.clone(), table.listen());
    let tcp = server::run_tcp_listener(engine, table.listen());
    tokio::try_join!(udp, tcp)?;
    Ok(())
}
