//! Tillhouse CLI - Backend seeding and operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the backend with demo customers and items from a YAML file
//! till-cli seed -f seed-data.yaml
//!
//! # Seed only one record kind
//! till-cli seed -f seed-data.yaml --customers-only
//! till-cli seed -f seed-data.yaml --items-only
//!
//! # Verify the backend is reachable and show record counts
//! till-cli check
//! ```
//!
//! The backend location comes from the same environment variables the POS
//! server uses (`POS_BACKEND_URL`, optional `POS_BACKEND_TOKEN`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "till-cli")]
#[command(author, version, about = "Tillhouse POS CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the backend with demo data from a YAML file
    Seed {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,

        /// Only seed customers
        #[arg(long, conflicts_with = "items_only")]
        customers_only: bool,

        /// Only seed items
        #[arg(long)]
        items_only: bool,
    },
    /// Check backend connectivity and show record counts
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed {
            file,
            customers_only,
            items_only,
        } => commands::seed::run(&file, customers_only, items_only).await?,
        Commands::Check => commands::check::run().await?,
    }
    Ok(())
}
