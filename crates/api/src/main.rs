//! Priceloom - catalog price synchronization for the Shopify Admin API
//!
//! Every flow is a subcommand; `serve` exposes the flows as streamed
//! background jobs plus the webhook receiver.

mod flows;
mod policy;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use priceloom_domain::{constants, Result, ShopConfig};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "priceloom", version, about = "Catalog price synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adjust all variant prices by a percentage via a bulk mutation
    Percentage {
        /// Percentage to adjust prices by (e.g. 10 or -5)
        #[arg(long, allow_hyphen_values = true)]
        percent: f64,
        #[arg(long, default_value = constants::SNAPSHOT_FILE_NAME)]
        snapshot: PathBuf,
    },
    /// Restore all prices from the snapshot file
    Reset {
        #[arg(long, default_value = constants::SNAPSHOT_FILE_NAME)]
        snapshot: PathBuf,
    },
    /// Propagate base-price metafields to variant prices
    SyncBase {
        /// Concurrent workers, each with its own API connection
        #[arg(long, default_value_t = constants::DEFAULT_WORKER_COUNT)]
        workers: usize,
    },
    /// Apply surcharge pricing to ensemble-tagged products
    Ensemble {
        #[arg(long, default_value = "variant_prices.json")]
        surcharges: PathBuf,
    },
    /// Run a bulk mutation from a JSON file of variant id/price pairs
    Bulk {
        /// JSON array of `{id, price}` objects
        #[arg(long, default_value = "bulk_payload.json")]
        file: PathBuf,
    },
    /// Seed base-price metafields from first-variant prices
    InitBase,
    /// Register the metafield webhook for this deployment
    RegisterWebhook {
        /// Public base URL of the running `serve` instance
        #[arg(long)]
        app_url: String,
    },
    /// Run the HTTP control surface (job streams + webhook receiver)
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logging first, so .env loading is visible.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(%err, "no .env file loaded"),
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "operation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ShopConfig::from_env()?;

    match cli.command {
        Command::Percentage { percent, snapshot } => {
            flows::percentage::run(config, percent, &snapshot).await
        }
        Command::Reset { snapshot } => flows::reset::run(config, &snapshot).await,
        Command::SyncBase { workers } => flows::base::sync(config, workers).await,
        Command::Ensemble { surcharges } => flows::ensemble::run(config, &surcharges).await,
        Command::Bulk { file } => flows::bulk_file::run(config, &file).await,
        Command::InitBase => flows::base::init(config).await,
        Command::RegisterWebhook { app_url } => flows::webhook::register(config, &app_url).await,
        Command::Serve { bind } => server::serve(config, bind).await,
    }
}
