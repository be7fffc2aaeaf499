//! Schema bootstrap command

use anyhow::{Context, Result};
use parksurvey_server::ensure_schema;

use super::connect_from_env;

pub async fn run_migrate() -> Result<()> {
    let pool = connect_from_env().await?;
    let result = ensure_schema(&pool).await.context("Failed to create people_info");
    pool.close_all().await;
    result?;

    println!("people_info is ready");
    Ok(())
}
