//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Thermocast - average the current temperature of a city across several
/// weather services
///
/// Every enabled provider is queried at the same time. If any of them fails,
/// the whole request fails; there is no partial average.
///
/// Examples:
///   thermocast --city London
///   thermocast --city "New York" --format json
///   thermocast --serve --bind 127.0.0.1:8080
///   thermocast --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// City to look up once and print
    #[arg(
        long,
        value_name = "CITY",
        required_unless_present_any = ["serve", "init_config"],
        conflicts_with = "serve"
    )]
    pub city: Option<String>,

    /// Run the HTTP server (GET /weather/{city})
    #[arg(long)]
    pub serve: bool,

    /// Address for the HTTP server
    ///
    /// Overrides `server.bind` from the config file. Default: 0.0.0.0:8080.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .thermocast.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-request timeout for provider calls, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// OpenWeatherMap API key
    #[arg(long, value_name = "KEY", env = "OPENWEATHERMAP_API_KEY", hide_env_values = true)]
    pub owm_key: Option<String>,

    /// Weather Underground API key
    #[arg(long, value_name = "KEY", env = "WUNDERGROUND_API_KEY", hide_env_values = true)]
    pub wu_key: Option<String>,

    /// Leave OpenWeatherMap out of the average
    #[arg(long)]
    pub no_openweathermap: bool,

    /// Leave Weather Underground out of the average
    #[arg(long)]
    pub no_wunderground: bool,

    /// Query providers one after another instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Output format for --city (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .thermocast.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for a one-off lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable line (default)
    #[default]
    Text,
    /// Same JSON body the server returns
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        match (&self.city, self.serve) {
            (None, false) => return Err("Either --city or --serve is required".to_string()),
            (Some(_), true) => return Err("Cannot use both --city and --serve".to_string()),
            (Some(city), false) if city.trim().is_empty() => {
                return Err("City must not be empty".to_string())
            }
            _ => {}
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.no_openweathermap && self.no_wunderground {
            return Err("At least one provider must stay enabled".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            city: Some("London".to_string()),
            serve: false,
            bind: None,
            config: None,
            timeout: None,
            owm_key: None,
            wu_key: None,
            no_openweathermap: false,
            no_wunderground: false,
            sequential: false,
            format: OutputFormat::Text,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_lookup() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_requires_a_mode() {
        let mut args = make_args();
        args.city = None;
        assert!(args.validate().is_err());

        args.serve = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_city() {
        let mut args = make_args();
        args.city = Some("  ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.serve = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_all_providers_disabled() {
        let mut args = make_args();
        args.no_openweathermap = true;
        args.no_wunderground = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.city = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from(["thermocast", "--city", "Oslo", "--format", "json"]).unwrap();
        assert_eq!(args.city.as_deref(), Some("Oslo"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.serve);
    }
}
