use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use loop_coverage::config::Settings;
use loop_coverage::coverage::check_coverage;
use loop_coverage::geo::Coordinate;
use loop_coverage::server;
use tracing_subscriber::EnvFilter;

/// Coverage lookup for ISP onboarding.
///
/// Resolves captured coordinates to a readable address and checks which
/// service coverage area, if any, serves a location.
///
/// Examples:
///   coverage reverse --lat -26.2041 --lon 28.0473
///   coverage check --lat -26.1076 --lon 28.0567
///   coverage check --coordinates "-26.1076,28.0567"
///   coverage check --location "Johannesburg" --areas-file areas.json
///   coverage providers --area ca-001 --areas-file areas.json --providers-file links.json
///   coverage serve --port 8080
#[derive(Parser)]
#[command(name = "coverage", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a coordinate to a human-readable address.
    Reverse {
        /// Latitude (-90 to 90).
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude (-180 to 180).
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Find the coverage area serving a coordinate or a typed location.
    Check {
        #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "coordinates")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat", conflicts_with = "coordinates")]
        lon: Option<f64>,
        /// Coordinate as "lat,lng", e.g. "-26.2,28.0".
        #[arg(long, allow_hyphen_values = true)]
        coordinates: Option<Coordinate>,
        /// Free-text location, matched against area names.
        #[arg(long)]
        location: Option<String>,
    },
    /// List the service providers offering service in a coverage area.
    Providers {
        /// Coverage area id.
        #[arg(long)]
        area: String,
    },
    /// Print the gazetteer used for the offline fallback.
    Gazetteer,
    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, short = 'p', default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;

    match cli.command {
        Command::Reverse { lat, lon } => {
            let coord = Coordinate::new(lat, lon).context("invalid coordinates")?;
            let resolver = settings.resolver().context("failed to build resolver")?;
            let loc = tokio::task::spawn_blocking(move || resolver.reverse_geocode(coord)).await?;
            println!("{}", serde_json::to_string_pretty(&loc)?);
        }
        Command::Check { lat, lon, coordinates, location } => {
            let coord = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon).context("invalid coordinates")?),
                _ => coordinates,
            };
            if coord.is_none() && location.is_none() {
                bail!("provide --lat and --lon, --coordinates, or --location");
            }
            let store = settings.store()?;
            let areas = tokio::task::spawn_blocking(move || store.active_areas())
                .await?
                .context("could not load coverage areas, please try again")?;
            let found = check_coverage(coord, location.as_deref(), &areas);
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        Command::Providers { area } => {
            let store = settings.store()?;
            let lookup = area.clone();
            let providers = tokio::task::spawn_blocking(move || store.providers_for_area(&lookup))
                .await?
                .with_context(|| format!("could not load service providers for area {}", area))?;
            println!("{}", serde_json::to_string_pretty(&providers)?);
        }
        Command::Gazetteer => {
            let resolver = settings.resolver().context("failed to build resolver")?;
            println!("{}", serde_json::to_string_pretty(resolver.gazetteer())?);
        }
        Command::Serve { host, port } => {
            let resolver = settings.resolver().context("failed to build resolver")?;
            let store = settings.store().ok();
            server::start(&host, port, resolver, store)
                .await
                .with_context(|| format!("server on {}:{} failed", host, port))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_combined_coordinates() {
        let cli = Cli::try_parse_from(["coverage", "check", "--coordinates", "-26.2,28.0"]).unwrap();
        match cli.command {
            Command::Check { coordinates, lat, .. } => {
                assert_eq!(coordinates, Some(Coordinate { lat: -26.2, lon: 28.0 }));
                assert!(lat.is_none());
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_rejects_bad_or_conflicting_coordinates() {
        assert!(Cli::try_parse_from(["coverage", "check", "--coordinates", "-26.2"]).is_err());
        assert!(Cli::try_parse_from(["coverage", "check", "--coordinates", "95,28"]).is_err());
        assert!(Cli::try_parse_from([
            "coverage", "check", "--coordinates", "-26.2,28.0", "--lat", "-26.2", "--lon", "28.0",
        ])
        .is_err());
    }

    #[test]
    fn test_providers_subcommand() {
        let cli = Cli::try_parse_from(["coverage", "providers", "--area", "ca-001"]).unwrap();
        assert!(matches!(cli.command, Command::Providers { area } if area == "ca-001"));
    }
}
