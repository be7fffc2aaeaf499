//! Coordinate lookup command

use anyhow::{Context, Result};
use clap::Parser;
use parksurvey_core::{resolve_cell, ReferenceCell};
use serde_json::json;

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Park cell (H3 index or "lat,lng") to measure distance against
    #[arg(long, env = "PARK_H3_INDEX")]
    pub park: Option<String>,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

pub fn run_resolve(args: ResolveArgs) -> Result<()> {
    let cell = resolve_cell(args.lat, args.lng).context("Invalid coordinate")?;

    let distance = match args.park.as_deref() {
        Some(park) => {
            let reference = ReferenceCell::parse(park).context("Invalid park reference")?;
            Some(
                reference
                    .distance_from(cell)
                    .context("Grid distance to the park is undefined")?,
            )
        }
        None => None,
    };

    if args.json {
        println!(
            "{}",
            json!({ "h3Index": cell.to_string(), "hexDistanceToPark": distance })
        );
    } else {
        println!("h3index: {cell}");
        match distance {
            Some(d) => println!("hexdistancetopark: {d}"),
            None => println!("hexdistancetopark: (set --park or PARK_H3_INDEX)"),
        }
    }
    Ok(())
}
