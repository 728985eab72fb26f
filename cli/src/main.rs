//! Parkspot CLI
//!
//! Runs the parking spot server, or inspects and mutates the persisted
//! spot collection directly.
//!
//! ```sh
//! # Run with default config (~/.config/parkspot/config.toml)
//! parkspot
//!
//! # Custom config path and port
//! parkspot --config /etc/parkspot/config.toml serve --port 9000
//!
//! # Validate config without starting
//! parkspot check
//!
//! # Available spots within 2 km of the Louvre
//! parkspot nearby --lat 48.8606 --lon 2.3376 --radius-km 2
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use parkspot::config::AppConfig;
use parkspot::server::{build_service, init_tracing, ServerHandle, ServerOptions};
use parkspot::{Location, SpotId};

/// Parkspot: shared parking spot registry with live updates.
#[derive(Parser, Debug)]
#[command(
    name = "parkspot",
    version,
    about = "Shared parking spot registry with proximity search",
    long_about = "Parkspot: REST + WebSocket server for sharing free parking spots, \
                  plus offline commands over the same spot store.\n\n\
                  Default config: ~/.config/parkspot/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKSPOT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Override the spot snapshot file.
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API and WebSocket server (default).
    Serve {
        /// Override the listen port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate the configuration file and exit.
    Check,
    /// Print every stored spot.
    List,
    /// Print available spots near a position.
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in kilometres (default from config).
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Add an available spot and resolve its address.
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Reserve an available spot.
    Reserve { id: SpotId },
    /// Release a reserved spot.
    Unreserve { id: SpotId },
    /// Report a spot as taken.
    MarkUnavailable { id: SpotId },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(parkspot::config::config_path_from_env);

    let loaded = AppConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref path) = cli.storage {
        config.storage.path = Some(path.clone());
        config.storage.in_memory = false;
    }

    init_tracing(&config);

    let command = cli.command.unwrap_or(Command::Serve { port: None });

    // Only the server may fall back to defaults; offline commands would
    // otherwise read or write a store the user never configured.
    if let (true, Err(e)) = (requires_valid_config(&command), &loaded) {
        eprintln!("Invalid configuration {}: {}", config_path.display(), e);
        return ExitCode::FAILURE;
    }

    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    match run(command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn requires_valid_config(command: &Command) -> bool {
    !matches!(command, Command::Serve { .. })
}

async fn run(command: Command, mut config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                info!("CLI override: port = {}", port);
                config.server.port = port;
            }

            let handle = ServerHandle::start(ServerOptions { config }).await?;
            handle.install_signal_handler();
            info!("Press Ctrl+C to shutdown gracefully.");
            handle.wait().await;
        }
        Command::Check => {
            println!("Configuration is valid");
            println!("   API address : {}", config.server.address());
            match config.storage.snapshot_path() {
                Some(path) => println!("   Storage     : {}", path.display()),
                None => println!("   Storage     : in-memory"),
            }
            println!("   Geocoder    : {:?}", config.geocoder.provider);
            println!("   Radius (km) : {}", config.proximity.radius_km);
            println!("   Log level   : {}", config.logging.level);
        }
        Command::List => {
            let service = build_service(&config)?;
            print_json(&*service.list().await)?;
        }
        Command::Nearby { lat, lon, radius_km } => {
            let service = build_service(&config)?;
            let location = Location::new(lat, lon)?;
            print_json(&service.nearby(Some(location), radius_km).await?)?;
        }
        Command::Add { lat, lon } => {
            let service = build_service(&config)?;
            let added = service.add_spot(Location::new(lat, lon)?).await?;
            if let Some(ref e) = added.address_error {
                eprintln!("warning: address lookup failed: {}", e);
            }
            print_json(&added.spot)?;
        }
        Command::Reserve { id } => {
            let service = build_service(&config)?;
            print_json(&service.reserve(id).await?)?;
        }
        Command::Unreserve { id } => {
            let service = build_service(&config)?;
            print_json(&service.unreserve(id).await?)?;
        }
        Command::MarkUnavailable { id } => {
            let service = build_service(&config)?;
            print_json(&service.mark_unavailable(id).await?)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
