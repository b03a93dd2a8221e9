use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vaayu::{
    AppState, AvwxClient, CachedProvider, MetarReport, ObservationProvider, StationHistory,
    StationId, VaayuConfig, logging, web,
};

#[derive(Parser)]
#[command(name = "vaayu", version, about = "METAR weather dashboard backend")]
struct Cli {
    /// Configuration file (defaults to the user config dir, then ./config.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API and dashboard
    Serve {
        /// Override the configured port
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Fetch and classify a single station's current METAR
    Metar {
        /// ICAO station code, e.g. KJFK
        icao: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = VaayuConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;

    let client = AvwxClient::new(&config.provider)?;
    let provider = CachedProvider::new(
        client,
        Duration::from_secs(config.cache.ttl_seconds.into()),
    );

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let history = StationHistory::new(
                config.history.capacity as usize,
                config.history_seed(),
            );
            let state = AppState::new(Arc::new(provider), history);
            web::run(&config.server, state).await
        }
        Command::Metar { icao } => {
            let station = StationId::parse(&icao)?;
            let observation = provider
                .fetch_observation(&station)
                .await
                .with_context(|| format!("Failed to fetch METAR for {station}"))?;
            print!("{}", MetarReport::build(observation));
            Ok(())
        }
    }
}
