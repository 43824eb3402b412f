//! dns-responder binary
//!
//! Loads configuration, then runs the UDP DNS server, the HTTP API and a
//! periodic stats logger until Ctrl+C.

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use dns_responder::api::{self, Metrics};
use dns_responder::config::ServerConfig;
use dns_responder::dns::{self, DnsHandler, StaticZone};

/// Minimal DNS responder
#[derive(Parser, Debug)]
#[command(name = "dns-responder")]
#[command(version)]
#[command(about = "Minimal DNS responder over UDP", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "dns-responder.toml")]
    config: PathBuf,

    /// Address to bind the DNS and API sockets to
    #[arg(long)]
    listen: Option<IpAddr>,

    /// DNS server port (requires root or CAP_NET_BIND_SERVICE for port 53)
    #[arg(long)]
    dns_port: Option<u16>,

    /// HTTP API port for metrics
    #[arg(long)]
    api_port: Option<u16>,

    /// Do not start the HTTP API
    #[arg(long)]
    no_api: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    // Load configuration
    let config = if args.config.exists() {
        ServerConfig::load(&args.config)?
    } else {
        warn!("Config file {:?} not found, using defaults", args.config);
        ServerConfig::default()
    };

    // Override config with CLI args
    let config = config
        .with_listen_addr(args.listen)
        .with_dns_port(args.dns_port)
        .with_api_port(args.api_port);
    let config = if args.no_api {
        config.with_api_enabled(false)
    } else {
        config
    };

    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("🌐 dns-responder v{}", env!("CARGO_PKG_VERSION"));
    info!("⚙️  Configuration:");
    info!("   DNS: {}:{}", config.listen_addr, config.dns_port);
    if config.enable_api {
        info!("   API port: {}", config.api_port);
    }
    info!("   Max packet size: {} bytes", config.max_packet_size);
    match config.fallback_ipv4 {
        Some(addr) => info!("   Fallback A answer: {} (TTL {}s)", addr, config.default_ttl),
        None => info!("   Fallback A answer: disabled"),
    }

    let shared_config = Arc::new(config);

    let zone = Arc::new(StaticZone::from_config(&shared_config)?);
    info!("📦 Zone loaded with {} records", zone.len());

    let metrics = Arc::new(Metrics::new());
    let handler = Arc::new(DnsHandler::new(
        zone.clone(),
        metrics.clone(),
        shared_config.max_packet_size,
    ));

    // Start all services concurrently
    let dns_handle = tokio::spawn(dns::run_dns_server(
        shared_config.clone(),
        handler,
        metrics.clone(),
    ));

    let api_handle = tokio::spawn({
        let config = shared_config.clone();
        let zone = zone.clone();
        let metrics = metrics.clone();
        async move {
            if config.enable_api {
                api::run_api_server(config, zone, metrics).await
            } else {
                std::future::pending().await
            }
        }
    });

    let stats_handle = tokio::spawn(run_stats_logger(
        shared_config.clone(),
        metrics.clone(),
    ));

    info!("✅ All services started");
    info!("   Press Ctrl+C to shutdown gracefully");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received");
        }
        result = dns_handle => {
            error!("DNS server exited: {:?}", result);
        }
        result = api_handle => {
            error!("HTTP API exited: {:?}", result);
        }
        result = stats_handle => {
            error!("Stats logger exited: {:?}", result);
        }
    }

    let s = metrics.snapshot();
    info!(
        "👋 dns-responder shutting down after {} datagrams ({} decode errors)",
        s.datagrams_received, s.decode_errors
    );
    Ok(())
}

/// Periodic stats line
async fn run_stats_logger(
    config: Arc<ServerConfig>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(
        config.stats_interval_secs,
    ));
    // First tick fires immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let s = metrics.snapshot();
        info!(
            "📊 Status: {} received, {} sent, {} noerror, {} nxdomain, {} formerr, {} notimp, {} servfail",
            s.datagrams_received,
            s.responses_sent,
            s.noerror,
            s.nxdomain,
            s.formerr,
            s.notimp,
            s.servfail
        );
    }
}
