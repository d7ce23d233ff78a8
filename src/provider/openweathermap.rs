//! OpenWeatherMap backend.
//!
//! The current-weather endpoint reports `main.temp` in Kelvin when no `units`
//! parameter is given, so the reading is returned unchanged.

use super::{fetch_body, join_segments, ProviderError, WeatherProvider};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

const NAME: &str = "openweathermap";

/// Subset of the current-weather response we care about.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReading,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    #[serde(rename = "temp")]
    kelvin: f64,
}

/// Fetches readings from api.openweathermap.org.
#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMap {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn url(&self, city: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = join_segments(NAME, &self.base_url, &["data", "2.5", "weather"])?;
        url.query_pairs_mut()
            .append_pair("APPID", &self.api_key)
            .append_pair("q", city);
        Ok(url)
    }
}

/// Extract the Kelvin reading from a response body.
fn parse_kelvin(body: &str) -> Result<f64, ProviderError> {
    let weather: CurrentWeather =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode {
            provider: NAME,
            message: e.to_string(),
        })?;
    finite(weather.main.kelvin)
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    fn name(&self) -> &str {
        NAME
    }

    async fn temperature(&self, city: &str) -> Result<f64, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Unavailable(format!(
                "{}: no API key configured",
                NAME
            )));
        }

        let body = fetch_body(&self.client, NAME, self.url(city)?).await?;
        let kelvin = parse_kelvin(&body)?;

        info!("{}: {}: {:.2}", NAME, city, kelvin);
        Ok(kelvin)
    }
}

fn finite(kelvin: f64) -> Result<f64, ProviderError> {
    if kelvin.is_finite() {
        Ok(kelvin)
    } else {
        Err(ProviderError::Decode {
            provider: NAME,
            message: format!("reading is not a finite number: {}", kelvin),
        })
    }
}
