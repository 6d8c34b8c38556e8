#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for ward air-quality data.
//!
//! ```text
//! airwatch fetch [--lat 28.6 --lng 77.2]
//! airwatch search <query>
//! airwatch nearest
//! airwatch analyze [--lat 28.6 --lng 77.2] [--role authority] [--index 0]
//! airwatch tiles
//! ```
//!
//! Global flags: `--config <file>` replaces the built-in settings, `--seed`
//! makes synthesized values reproducible, and `--json` prints raw JSON
//! instead of tables. Logging is controlled by `RUST_LOG`.

mod config;

use std::path::PathBuf;

use airwatch_aggregate::Aggregator;
use airwatch_ai::{AnalysisRequester as _, WardAnalyst};
use airwatch_source::waqi::WaqiClient;
use airwatch_ward_models::{AnalysisResult, GeoPoint, UserRole, Ward};
use clap::{Parser, Subcommand};
use rand::SeedableRng as _;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "airwatch", about = "Ward-level air-quality aggregation and analysis")]
struct Cli {
    /// TOML config file (defaults to the built-in settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for synthesized values (trends, estimates, fallback data)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch wards around a point, or across the whole region
    Fetch {
        #[command(flatten)]
        point: PointArgs,
    },
    /// Search stations by name (at least 3 characters)
    Search {
        /// Free-text query
        query: String,
    },
    /// Show the station nearest to this machine
    Nearest,
    /// Fetch wards and request an AI analysis of one of them
    Analyze {
        #[command(flatten)]
        point: PointArgs,
        /// Audience the analysis is written for
        #[arg(long, default_value = "resident")]
        role: UserRole,
        /// Position of the ward in the fetched list
        #[arg(long, default_value = "0")]
        index: usize,
    },
    /// List the region tiles a whole-region fetch queries
    Tiles,
}

#[derive(clap::Args)]
struct PointArgs {
    /// Latitude of the query point
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of the query point
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

impl PointArgs {
    fn point(&self) -> Option<GeoPoint> {
        self.lat.zip(self.lng).map(|(lat, lng)| GeoPoint::new(lat, lng))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    let mut rng = cli
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    let feed = WaqiClient::new(config.waqi.clone())?;
    let aggregator = Aggregator::new(feed, config.region.clone(), config.waqi.request_timeout());

    match cli.command {
        Commands::Fetch { point } => {
            let wards = aggregator
                .fetch_pollution_data(point.point(), &mut rng)
                .await;
            print_wards(&wards, cli.json)?;
        }
        Commands::Search { query } => {
            let wards = aggregator.search_stations(&query, &mut rng).await;
            if wards.is_empty() && !cli.json {
                println!("No stations match '{query}'.");
                return Ok(());
            }
            print_wards(&wards, cli.json)?;
        }
        Commands::Nearest => {
            let Some(ward) = aggregator.nearest_station(&mut rng).await else {
                if cli.json {
                    println!("null");
                    return Ok(());
                }
                eprintln!("Nearest station unavailable.");
                std::process::exit(1);
            };
            print_wards(std::slice::from_ref(&ward), cli.json)?;
        }
        Commands::Analyze { point, role, index } => {
            let wards = aggregator
                .fetch_pollution_data(point.point(), &mut rng)
                .await;
            let Some(ward) = wards.get(index) else {
                return Err(format!(
                    "ward index {index} out of range ({} wards fetched)",
                    wards.len()
                )
                .into());
            };

            let analyst = WardAnalyst::new(&config.analysis)?;
            let analysis = analyst.request_analysis(ward, role).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(ward, role, &analysis);
            }
        }
        Commands::Tiles => {
            let tiles = aggregator.region_tiles();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tiles)?);
            } else {
                for (i, tile) in tiles.iter().enumerate() {
                    println!("{i:>3}  {tile}");
                }
                println!("\n{} tile(s)", tiles.len());
            }
        }
    }

    Ok(())
}

fn print_wards(wards: &[Ward], json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(wards)?);
        return Ok(());
    }

    println!(
        "{:<22} {:<30} {:>5} {:<26} TREND",
        "ID", "NAME", "AQI", "PRIMARY SOURCE"
    );
    println!("{}", "-".repeat(110));

    for ward in wards {
        let trend = ward
            .trend
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:<22} {:<30} {:>5} {:<26} {trend}",
            ward.id,
            shorten(&ward.name, 30),
            ward.aqi,
            ward.primary_source
        );
    }

    println!("\n{} ward(s)", wards.len());
    Ok(())
}

fn print_analysis(ward: &Ward, role: UserRole, analysis: &AnalysisResult) {
    println!("{} (AQI {}), {role} view\n", ward.name, ward.aqi);

    println!("Recommendations:");
    for rec in &analysis.recommendations {
        println!("  [{}] {}: {}", rec.kind, rec.title, rec.description);
    }

    println!("\nTrend: {}", analysis.trend_analysis);

    if !analysis.source_breakdown.is_empty() {
        println!("\nSources:");
        for share in &analysis.source_breakdown {
            println!(
                "  {:>5.1}%  {} ({})",
                share.percentage, share.source, share.confidence
            );
        }
    }

    if !analysis.news.is_empty() {
        println!("\nNews:");
        for item in &analysis.news {
            println!("  {} ({}, {})", item.title, item.source, item.time_ago);
            println!("    {}", item.summary);
        }
    }

    if !analysis.grounding_urls.is_empty() {
        println!("\nSources cited:");
        for link in &analysis.grounding_urls {
            println!("  {} <{}>", link.title, link.uri);
        }
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
