//! Thermocast - average the temperature of a city across weather services.
//!
//! Every configured provider is queried concurrently and the readings are
//! averaged. One failing provider fails the whole lookup.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, provider failure, bind failure, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod provider;
mod server;

use analysis::MultiProvider;
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::TemperatureReport;
use provider::{OpenWeatherMap, WeatherProvider, WeatherUnderground};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Thermocast v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .thermocast.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml()?)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let providers = build_providers(&config)?;
    info!("{} providers: {}", providers.len(), providers.names().join(", "));

    if args.serve {
        let state = server::AppState::new(providers, args.sequential);
        return server::serve(&config.server.bind, state).await;
    }

    let city = args.city.as_deref().unwrap_or_default();
    let begin = Instant::now();
    let temp = if args.sequential {
        providers.temperature_sequential(city).await
    } else {
        providers.temperature(city).await
    }
    .with_context(|| format!("Could not get the temperature for {}", city))?;

    let report = TemperatureReport::new(city, temp, begin.elapsed());
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::Text => println!("{}", report),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Instantiate every enabled provider, sharing one HTTP client.
fn build_providers(config: &Config) -> Result<MultiProvider> {
    let client = provider::http_client(Duration::from_secs(config.http.timeout_seconds))
        .context("Failed to create HTTP client")?;

    let mut providers: Vec<Arc<dyn WeatherProvider>> = Vec::new();

    if config.openweathermap.enabled {
        if config.openweathermap.api_key.is_empty() {
            warn!("openweathermap: no API key configured, lookups will fail");
        }
        providers.push(Arc::new(OpenWeatherMap::new(
            client.clone(),
            config.openweathermap.base_url.clone(),
            config.openweathermap.api_key.clone(),
        )));
    }

    if config.wunderground.enabled {
        providers.push(Arc::new(WeatherUnderground::new(
            client,
            config.wunderground.base_url.clone(),
            config.wunderground.api_key.clone(),
        )));
    }

    Ok(MultiProvider::new(providers))
}
