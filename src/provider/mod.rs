//! Weather providers.
//!
//! A provider answers one question: what is the temperature in a city right
//! now, in Kelvin. Every backend normalizes its reading to Kelvin before
//! returning, so the aggregator can combine them without knowing where they
//! came from.

pub mod openweathermap;
pub mod wunderground;

pub use openweathermap::OpenWeatherMap;
pub use wunderground::WeatherUnderground;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors a single provider can report.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("{provider}: request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream service answered with a non-success status.
    #[error("{provider}: upstream returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not contain a usable reading.
    #[error("{provider}: could not decode response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// The provider is unable to answer for any other reason.
    #[error("{0}")]
    Unavailable(String),
}

/// A source of temperature readings.
///
/// Implementations must be safe to call concurrently with themselves and with
/// other providers. Any state they hold is read-only after construction.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Current temperature in `city`, in Kelvin.
    async fn temperature(&self, city: &str) -> Result<f64, ProviderError>;
}

/// Build the shared HTTP client used by the network-backed providers.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("thermocast/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Issue a GET request and return the body, mapping transport and status
/// failures to [`ProviderError`].
pub(crate) async fn fetch_body(
    client: &reqwest::Client,
    provider: &'static str,
    url: reqwest::Url,
) -> Result<String, ProviderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status,
            body,
        });
    }

    Ok(body)
}

/// Append `segments` to the path of `base`, percent-encoding each one.
pub(crate) fn join_segments(
    provider: &'static str,
    base: &str,
    segments: &[&str],
) -> Result<reqwest::Url, ProviderError> {
    let mut url = reqwest::Url::parse(base).map_err(|e| ProviderError::Decode {
        provider,
        message: format!("invalid base URL {base}: {e}"),
    })?;

    url.path_segments_mut()
        .map_err(|_| ProviderError::Decode {
            provider,
            message: format!("base URL cannot carry a path: {base}"),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
