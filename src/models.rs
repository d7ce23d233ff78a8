//! Data models shared by the CLI and the HTTP server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Convert a Celsius reading to Kelvin.
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Convert a Kelvin reading to Celsius.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// The answer for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReport {
    /// City as requested.
    pub city: String,
    /// Averaged temperature in Kelvin.
    pub temp: f64,
    /// Time spent producing the answer, e.g. `"412.3ms"`.
    pub took: String,
}

impl TemperatureReport {
    pub fn new(city: impl Into<String>, temp: f64, took: Duration) -> Self {
        Self {
            city: city.into(),
            temp,
            took: format!("{:?}", took),
        }
    }
}

impl fmt::Display for TemperatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} K ({:.2} °C), took {}",
            self.city,
            self.temp,
            kelvin_to_celsius(self.temp),
            self.took
        )
    }
}
