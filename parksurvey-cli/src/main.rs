//! parksurvey CLI - park survey ingestion and export
//!
//! - `serve`: run the HTTP API (submissions, cell lookup, CSV export)
//! - `export`: write every stored response as CSV
//! - `resolve`: show the H3 cell and park distance for a coordinate
//! - `migrate`: create the `people_info` table

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "parksurvey",
    author,
    version,
    about = "Willingness-to-pay park survey: geo-keyed response storage and export",
    long_about = "Store survey responses keyed by the H3 resolution-9 cell of the respondent's \
                  home, measure their grid distance to the park, and export the dataset as CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),

    /// Export every stored response as CSV
    Export(commands::export::ExportArgs),

    /// Resolve a coordinate to its H3 cell and park distance
    Resolve(commands::resolve::ResolveArgs),

    /// Create the people_info table if it does not exist
    Migrate,
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before the subscriber: .env may set RUST_LOG
    parksurvey_core::config::load_dotenv();
    init_tracing().ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Export(args) => commands::run_export(args).await?,
        Commands::Resolve(args) => commands::run_resolve(args)?,
        Commands::Migrate => commands::run_migrate().await?,
    }
    Ok(())
}
