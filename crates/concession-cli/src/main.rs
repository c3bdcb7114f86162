mod compare;
mod cta;
mod locate;
mod surface;

use clap::{Parser, Subcommand};
use concession_core::{AppConfig, Coordinate, VehicleCategory};
use tracing_subscriber::EnvFilter;

use crate::cta::CtaCommands;

#[derive(Debug, Parser)]
#[command(name = "concession")]
#[command(about = "Dealership locator and utility vehicle comparator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Address suggestions for a partial query; reads queries from stdin
    /// as they are typed when none is given
    Suggest {
        query: Option<String>,
    },
    /// Resolve an address or postal code to a coordinate
    Geocode {
        address: String,
    },
    /// Driving route between two "lon,lat" coordinates
    Route {
        #[arg(long)]
        from: Coordinate,
        #[arg(long)]
        to: Coordinate,
    },
    /// Call-to-action hand-off to the map page
    Cta {
        #[command(subcommand)]
        command: CtaCommands,
    },
    /// Locate the user and rank dealerships by driving distance
    Map {
        /// Search from this address instead of redeeming a pending intent
        #[arg(long, conflicts_with = "geolocate")]
        address: Option<String>,
        /// Use the position source
        #[arg(long)]
        geolocate: bool,
        /// Position reported by the position source, as "lon,lat".
        /// Falls back to CONCESSION_FIXED_POSITION.
        #[arg(long)]
        position: Option<Coordinate>,
        /// Draw directions to this dealership once located
        #[arg(long)]
        directions: Option<String>,
    },
    /// Closest catalog vehicle for the given needs
    Compare {
        #[arg(long)]
        category: VehicleCategory,
        /// Payload in kg
        #[arg(long)]
        payload: Option<f64>,
        /// Load volume in m³
        #[arg(long)]
        volume: Option<f64>,
        /// Load length in m
        #[arg(long)]
        length: Option<f64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = concession_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Suggest { query }) => {
            let config = load_config()?;
            locate::run_suggest(&config, query.as_deref()).await
        }
        Some(Commands::Geocode { address }) => {
            let config = load_config()?;
            locate::run_geocode(&config, &address).await
        }
        Some(Commands::Route { from, to }) => {
            let config = load_config()?;
            locate::run_route(&config, from, to).await
        }
        Some(Commands::Cta { command }) => {
            let config = load_config()?;
            cta::run_cta(&config, &command)
        }
        Some(Commands::Map {
            address,
            geolocate,
            position,
            directions,
        }) => {
            let config = load_config()?;
            let start = match address {
                Some(address) => locate::MapStart::Address(address),
                None if geolocate => locate::MapStart::Geolocate,
                None => locate::MapStart::PendingIntent,
            };
            let position = position.or(config.fixed_position);
            locate::run_map(&config, start, position, directions.as_deref()).await
        }
        // The comparator works offline and needs no Mapbox token.
        Some(Commands::Compare {
            category,
            payload,
            volume,
            length,
            json,
        }) => {
            init_tracing("info")?;
            compare::run_compare(category, payload, volume, length, json)
        }
        None => {
            println!("concession: run with --help for the available commands");
            Ok(())
        }
    }
}
