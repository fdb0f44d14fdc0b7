//! pNode network status binary.
//!
//! Serves the dashboard API or runs one-off resolutions from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pnode_status::{
    AppConfig, NetworkStatusResolver, NetworkSummary, NodeStatus, generate_simulation,
    server::{SummaryResponse, serve},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pnode-status")]
#[command(about = "Storage pNode network status with live RPC and simulation fallback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// YAML or JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the primary storage-network RPC endpoint
    #[arg(long)]
    primary_rpc: Option<String>,

    /// Override the secondary cluster RPC endpoint
    #[arg(long)]
    secondary_rpc: Option<String>,

    /// Seed for synthesized values
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Resolve once and print the response as JSON
    Resolve {
        #[arg(long)]
        pretty: bool,
    },

    /// Query every strategy and report which endpoints answer
    Probe,

    /// Resolve once and print headline figures
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// Print a simulated node set as JSON
    Simulate {
        #[arg(long, default_value = "50")]
        count: usize,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;

    if let Some(url) = &cli.primary_rpc {
        config.resolver.primary_rpc_url = url.clone();
    }
    if let Some(url) = &cli.secondary_rpc {
        config.resolver.secondary_rpc_url = url.clone();
    }
    if cli.seed.is_some() {
        config.resolver.rng_seed = cli.seed;
    }
    config
        .resolver
        .validate()
        .context("invalid resolver settings")?;

    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = load_config(&cli)?;
    let resolver = NetworkStatusResolver::from_config(config.resolver.clone())
        .context("failed to build HTTP transport")?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(addr) = bind {
                config.server.bind_addr = addr;
            }
            info!(
                primary = %config.resolver.primary_rpc_url,
                secondary = %config.resolver.secondary_rpc_url,
                "starting network status API"
            );
            serve(&config.server, Arc::new(resolver)).await?;
        }

        Commands::Resolve { pretty } => {
            let response = resolver.resolve().await;
            print_json(&response, pretty)?;
        }

        Commands::Probe => {
            let reports = resolver.probe().await;
            println!("Probing {} strategies:", reports.len());
            for report in &reports {
                let mark = if report.is_ok() { "ok  " } else { "FAIL" };
                println!(
                    "  [{mark}] {:<24} {} {} ({} ms)",
                    report.strategy, report.method, report.endpoint, report.elapsed_ms
                );
                match &report.outcome {
                    pnode_status::ProbeOutcome::Ok { nodes } => {
                        println!("         {nodes} usable nodes");
                    }
                    pnode_status::ProbeOutcome::Failed { error } => {
                        println!("         {error}");
                    }
                }
            }
            if !reports.iter().any(|r| r.is_ok()) {
                println!("No live source reachable; the API would serve simulation data.");
            }
        }

        Commands::Summary { json } => {
            let response = resolver.resolve().await;
            if json {
                print_json(&SummaryResponse::from_response(&response), true)?;
            } else {
                let summary = NetworkSummary::from_nodes(&response.nodes);
                println!("Source:          {}", response.source_mode);
                println!("Retrieved:       {}", response.retrieved_at.to_rfc3339());
                println!(
                    "Active nodes:    {}/{}",
                    summary.active_nodes, summary.total_nodes
                );
                println!("Total capacity:  {:.2} PB", summary.total_capacity_pb);
                println!("Network health:  {:.2}%", summary.network_health);
                if let Some(top) = &summary.top_node {
                    println!(
                        "Top node:        {} ({:.1} TB, {:.1}% uptime, {})",
                        top.short_id(),
                        top.storage_capacity,
                        top.uptime_ratio,
                        top.location_label
                    );
                }
                let offline = response
                    .nodes
                    .iter()
                    .filter(|n| n.operational_state == NodeStatus::Offline)
                    .count();
                println!("Offline nodes:   {offline}");
            }
        }

        Commands::Simulate { count } => {
            let mut rng = match config.resolver.rng_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            print_json(&generate_simulation(count, &mut rng), true)?;
        }
    }

    Ok(())
}
