//! CSV export command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use parksurvey_server::ResponseRepo;

use super::connect_from_env;

/// Arguments for the export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output file (default: stdout)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub async fn run_export(args: ExportArgs) -> Result<()> {
    let pool = connect_from_env().await?;
    let result = ResponseRepo::new(&pool).export_csv().await;
    pool.close_all().await;
    let csv = result.context("Failed to export survey responses")?;

    match args.out {
        Some(path) => {
            tokio::fs::write(&path, csv.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
