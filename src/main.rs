//! Command-line entry point.
//!
//! Usage:
//!   portal watch --out-dir ./public
//!   portal once
//!   portal context --delta delta.json --fpic fpic.json
//!   portal snc-payload --plane outer --intent traffic.signal-retime --eco-cost-nj 420 --risk-score 0.1

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use transparency_portal::corridor::{EcoDelta, FpicState};
use transparency_portal::render::VISIBLE_ERRORS;
use transparency_portal::{
    Config, DirectoryTarget, EcoCorridorClient, MemoryTarget, RenderTarget, StdoutTarget,
    TransparencyPortal,
};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Neighborhood transparency portal and eco-corridor payload helper", long_about = None)]
struct Cli {
    /// TOML config file (overrides PORTAL_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the metrics endpoint until Ctrl-C
    Watch {
        /// Write portal-root.html / portal-errors.html here instead of stdout
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Override the configured neighborhood
        #[arg(long)]
        neighborhood: Option<String>,
    },
    /// Fetch once and print the rendered fragment
    Once {
        #[arg(long)]
        neighborhood: Option<String>,
    },
    /// Build the corridor context from eco delta and FPIC state JSON files
    Context {
        #[arg(long)]
        delta: PathBuf,
        #[arg(long)]
        fpic: PathBuf,
    },
    /// Build an SNC payload
    SncPayload {
        #[arg(long)]
        plane: String,
        #[arg(long)]
        intent: String,
        #[arg(long)]
        eco_cost_nj: f64,
        #[arg(long)]
        risk_score: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transparency_portal=info,portal=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Watch {
            out_dir,
            neighborhood,
        } => watch(config, out_dir, neighborhood).await,
        Commands::Once { neighborhood } => once(config, neighborhood).await,
        Commands::Context { delta, fpic } => context(&config, &delta, &fpic),
        Commands::SncPayload {
            plane,
            intent,
            eco_cost_nj,
            risk_score,
        } => {
            let client = corridor_client(&config)?;
            let payload = client.build_snc_payload(plane, intent, eco_cost_nj, risk_score);
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
    }
}

async fn watch(
    mut config: Config,
    out_dir: Option<PathBuf>,
    neighborhood: Option<String>,
) -> Result<()> {
    if let Some(id) = neighborhood {
        config.portal.neighborhood_id = id;
    }
    let target: Box<dyn RenderTarget> = match out_dir {
        Some(dir) => {
            info!("Rendering into {}", dir.display());
            Box::new(DirectoryTarget::new(dir))
        }
        None => Box::new(StdoutTarget),
    };

    let portal = TransparencyPortal::new(config.portal, target)?;
    let shutdown = CancellationToken::new();
    let handle = portal.spawn(shutdown.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    shutdown.cancel();

    let portal = handle.await.context("Polling task panicked")?;
    info!("Stopped with {} recorded error(s)", portal.errors().count());
    Ok(())
}

async fn once(mut config: Config, neighborhood: Option<String>) -> Result<()> {
    if let Some(id) = neighborhood {
        config.portal.neighborhood_id = id;
    }
    let target = MemoryTarget::new();
    let mut portal = TransparencyPortal::new(config.portal, Box::new(target.clone()))?;
    portal.refresh_metrics().await;

    let mounted = target.snapshot();
    if let Some(root) = mounted.root {
        println!("{root}");
        return Ok(());
    }

    let last = portal
        .errors()
        .last()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| "no metrics returned".to_string());
    if let Some(errors) = mounted.errors {
        eprintln!("Last {VISIBLE_ERRORS} error(s):\n{errors}");
    }
    anyhow::bail!("Refresh failed: {last}")
}

fn context(config: &Config, delta: &Path, fpic: &Path) -> Result<()> {
    let client = corridor_client(config)?;
    let delta: EcoDelta = read_json(delta)?;
    let fpic: FpicState = read_json(fpic)?;

    let ctx = client.build_context(&delta, &fpic);
    if ctx.actuation_blocked() {
        tracing::warn!(
            "Corridor {} blocks actuation under this FPIC state",
            ctx.corridor_id
        );
    }
    println!("{}", serde_json::to_string_pretty(&ctx)?);
    Ok(())
}

fn corridor_client(config: &Config) -> Result<EcoCorridorClient> {
    let corridor = config
        .corridor
        .clone()
        .context("No [corridor] section in configuration")?;
    Ok(EcoCorridorClient::new(corridor))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}
