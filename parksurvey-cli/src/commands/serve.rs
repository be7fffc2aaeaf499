//! HTTP server command
//!
//! Validates the full startup configuration first; a missing database URL
//! or park reference stops the process before anything binds.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use parksurvey_core::config::SurveyConfig;
use parksurvey_server::{create_pool, ensure_schema, run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: server.bind from parksurvey.toml, else 127.0.0.1:8501)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = SurveyConfig::load().context("Invalid startup configuration")?;

    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid server.bind '{}'", config.server.bind))?,
    };

    tracing::info!(park = %config.reference, "Starting parksurvey server on {}", bind_addr);

    let pool = create_pool(&config.database_url, &config.pool)
        .await
        .context("Failed to create database pool")?;
    ensure_schema(&pool)
        .await
        .context("Failed to create people_info")?;

    let state = AppState::new(pool, config.reference, config.admin_token);
    let server = ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive,
    };

    run_server(state, server).await.context("Server error")?;

    Ok(())
}
