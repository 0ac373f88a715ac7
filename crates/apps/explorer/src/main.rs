mod commands;
mod report;
mod surface;

use std::sync::Arc;

use clap::Parser;
use foundation::geo::LatLon;
use lookup::{DisabledGeocoder, FixedLocation, Geocoder, LocationProvider, MapboxGeocoder};
use session::{Driver, Input, Session, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP, parse, parse_lat_lon};
use crate::report::{Summary, describe};
use crate::surface::TraceSurface;

/// Explore a street-tree dataset from the terminal.
#[derive(Debug, Parser)]
#[command(name = "canopy", version)]
struct Cli {
    /// Dataset file path or http(s) URL [default: $CANOPY_DATASET or data/trees.json]
    #[arg(long)]
    dataset: Option<String>,
    /// Viewport width in pixels; narrow viewports get the compact panel.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    /// Position reported by `locate`, as LAT,LON. Without it, locating fails.
    #[arg(long, value_parser = parse_lat_lon)]
    location: Option<LatLon>,
    /// Base URL of a Mapbox-compatible geocoding API.
    #[arg(long)]
    geocoder_url: Option<String>,
    /// Access token for the geocoding API; address search is disabled without one.
    #[arg(long)]
    geocoder_token: Option<String>,
}

impl Cli {
    fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if let Some(url) = &self.geocoder_url {
            config.geocoder_url = url.clone();
        }
        if let Some(token) = &self.geocoder_token {
            config.geocoder_token = Some(token.clone());
        }
        config
    }
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !(cli.width.is_finite() && cli.width > 0.0) {
        return Err(format!("invalid viewport width: {}", cli.width));
    }
    let config = cli.apply(SessionConfig::from_env());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    let result = runtime.block_on(explore(config, cli.width, cli.location));
    // The stdin reader thread may still be parked on a read.
    runtime.shutdown_background();
    result
}

async fn explore(config: SessionConfig, width: f64, location: Option<LatLon>) -> Result<(), String> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("canopy/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| format!("failed to build http client: {e}"))?;

    let dataset = formats::dataset_source(&config.dataset, http.clone());
    let geocoder: Arc<dyn Geocoder> = match &config.geocoder_token {
        Some(token) => Arc::new(MapboxGeocoder::new(config.geocoder_url.clone(), token.clone(), http)),
        None => {
            warn!("no geocoder token configured; address search is disabled");
            Arc::new(DisabledGeocoder)
        }
    };
    info!(geocoder = %geocoder.describe(), "lookups configured");
    let locator: Arc<dyn LocationProvider> = Arc::new(match location {
        Some(position) => FixedLocation::at(position),
        None => FixedLocation::unavailable(),
    });

    let session = Session::new(TraceSurface::default(), config, width);
    let mut driver = Driver::new(session, geocoder, locator);
    let handle = driver.handle();
    let mut events = driver.subscribe();

    let console = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut summary = Summary::default();
        println!("{HELP}");
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(err) => {
                            warn!(%err, "failed to read stdin");
                            break;
                        }
                    };
                    match parse(&line) {
                        Ok(Some(Command::Send(input))) => {
                            if !handle.send(input) {
                                break;
                            }
                        }
                        Ok(Some(Command::Species)) => println!("{}", summary.render_species()),
                        Ok(Some(Command::Neighborhoods)) => {
                            println!("{}", summary.render_neighborhoods())
                        }
                        Ok(Some(Command::Status)) => println!("{}", summary.render()),
                        Ok(Some(Command::Help)) => println!("{HELP}"),
                        Ok(Some(Command::Quit)) => break,
                        Ok(None) => {}
                        Err(message) => println!("{message}"),
                    }
                }
                Some(event) = events.recv() => {
                    summary.record(&event.payload);
                    println!("{}", describe(&event.payload));
                }
            }
        }
        handle.send(Input::Shutdown);
    };

    let (session, ()) = tokio::join!(driver.run(dataset), console);
    let surface = session.teardown();
    info!(commands = surface.commands(), "surface released");
    Ok(())
}
