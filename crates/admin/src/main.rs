//! Operator CLI for the HealthBridge patient store.
//!
//! Prints every result as JSON on stdout.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use database::Database;
use tracing::info;

use crate::cli::Args;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?.with_database_url(args.database_url.clone());
    info!(database_url = %config.database_url, "Opening store");

    let db = Database::connect_with_pool_size(&config.database_url, config.pool_size).await?;
    let output = commands::run(&db, args.command).await;
    db.close().await;

    println!("{}", serde_json::to_string_pretty(&output?)?);
    Ok(())
}
