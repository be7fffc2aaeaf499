//! Command implementations for the parksurvey CLI

pub mod export;
pub mod migrate;
pub mod resolve;
pub mod serve;

pub use export::run_export;
pub use migrate::run_migrate;
pub use resolve::run_resolve;
pub use serve::run_serve;

use anyhow::{Context, Result};
use parksurvey_core::config::{FileConfig, DATABASE_URL_VAR};
use parksurvey_server::{create_pool, SurveyPool};

/// Connect using `DATABASE_URL` and the pool settings from `parksurvey.toml`.
///
/// For commands that do not need the park reference.
pub(crate) async fn connect_from_env() -> Result<SurveyPool> {
    let database_url = std::env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL not set. Set it in the environment, ./.env or ~/.parksurvey/.env")?;
    let file = FileConfig::load().context("Failed to load parksurvey.toml")?;

    create_pool(&database_url, &file.pool)
        .await
        .context("Failed to create database pool")
}
