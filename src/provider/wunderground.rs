//! Weather Underground backend.
//!
//! The conditions endpoint reports `current_observation.temp_c` in Celsius.

use super::{fetch_body, join_segments, ProviderError, WeatherProvider};
use crate::models::celsius_to_kelvin;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

const NAME: &str = "wunderground";

#[derive(Debug, Deserialize)]
struct Conditions {
    current_observation: Observation,
}

#[derive(Debug, Deserialize)]
struct Observation {
    #[serde(rename = "temp_c")]
    celsius: f64,
}

/// Fetches readings from api.wunderground.com.
#[derive(Debug, Clone)]
pub struct WeatherUnderground {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherUnderground {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn url(&self, city: &str) -> Result<reqwest::Url, ProviderError> {
        let file = format!("{}.json", city);
        join_segments(
            NAME,
            &self.base_url,
            &["api", self.api_key.as_str(), "conditions", "q", file.as_str()],
        )
    }
}

fn parse_kelvin(body: &str) -> Result<f64, ProviderError> {
    let conditions: Conditions = serde_json::from_str(body).map_err(|e| ProviderError::Decode {
        provider: NAME,
        message: e.to_string(),
    })?;
    finite(celsius_to_kelvin(conditions.current_observation.celsius))
}

#[async_trait]
impl WeatherProvider for WeatherUnderground {
    fn name(&self) -> &str {
        NAME
    }

    async fn temperature(&self, city: &str) -> Result<f64, ProviderError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_reading_is_rejected() {
        for reading in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(finite(reading), Err(ProviderError::Decode { .. })));
        }
        assert_eq!(finite(280.5).unwrap(), 280.5);
    }

    #[test]
    fn test_parse_converts_celsius() {
        let body = r#"{"current_observation": {"temp_c": 10.0, "temp_f": 50.0}}"#;
        let kelvin = parse_kelvin(body).unwrap();
        assert!((kelvin - 283.15).abs() < 1e-9);
    }

    #[test]
    fn test_parse_error_response() {
        let body = r#"{"response": {"error": {"type": "keynotfound"}}}"#;
        assert!(matches!(
            parse_kelvin(body),
            Err(ProviderError::Decode { .. })
        ));
    }

    #[test]
    fn test_url_layout() {
        let provider = WeatherUnderground::new(
            reqwest::Client::new(),
            "http://api.wunderground.com".to_string(),
            "api-key".to_string(),
        );
        let url = provider.url("Paris").unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.wunderground.com/api/api-key/conditions/q/Paris.json"
        );
    }
}
