//! Temperature aggregation across providers.
//!
//! [`MultiProvider`] asks every configured provider for the same city at the
//! same time and averages the answers. It is all-or-nothing: the first error
//! to arrive is returned as-is and the remaining readings are never looked at.
//!
//! When several providers fail at once, which error is reported depends on
//! which one reaches the channel first. That is not stable across runs.

use crate::provider::{ProviderError, WeatherProvider};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Result of one provider call within a single aggregation.
type Outcome = Result<f64, ProviderError>;

/// Errors returned by [`MultiProvider`].
#[derive(Debug, Error)]
pub enum AggregateError {
    /// No providers are configured, so there is nothing to average.
    #[error("no weather providers configured")]
    NoProviders,

    /// A provider failed; its error is passed through untouched.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A provider task ended without reporting (it panicked).
    #[error("only {received} of {expected} providers reported a reading")]
    Incomplete { received: usize, expected: usize },
}

/// A fixed set of providers queried together.
#[derive(Clone)]
pub struct MultiProvider {
    providers: Vec<Arc<dyn WeatherProvider>>,
}

impl MultiProvider {
    pub fn new(providers: Vec<Arc<dyn WeatherProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Names of the configured providers, in order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Average temperature in `city` (Kelvin), querying all providers
    /// concurrently.
    ///
    /// Returns as soon as any provider fails. Providers still running at that
    /// point are left to finish on their own; their results are dropped.
    /// No timeout is applied here, so a provider that never answers stalls
    /// the call unless another one fails first.
    pub async fn temperature(&self, city: &str) -> Result<f64, AggregateError> {
        let expected = self.providers.len();
        if expected == 0 {
            return Err(AggregateError::NoProviders);
        }

        debug!("Querying {} providers for {}", expected, city);

        // One slot per provider: a task can always deposit its outcome.
        let (tx, mut rx) = mpsc::channel::<Outcome>(expected);

        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let city = city.to_string();
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = provider.temperature(&city).await;
                if tx.try_send(outcome).is_err() {
                    debug!("{}: result discarded, aggregation already finished", provider.name());
                }
            });
        }
        drop(tx);

        let mut sum = 0.0;
        for received in 0..expected {
            match rx.recv().await {
                Some(Ok(kelvin)) => sum += kelvin,
                Some(Err(e)) => {
                    warn!("Aggregation for {} failed: {}", city, e);
                    return Err(AggregateError::Provider(e));
                }
                None => return Err(AggregateError::Incomplete { received, expected }),
            }
        }

        Ok(sum / expected as f64)
    }

    /// Same contract as [`temperature`](Self::temperature), but queries one
    /// provider at a time in configuration order.
    pub async fn temperature_sequential(&self, city: &str) -> Result<f64, AggregateError> {
        if self.providers.is_empty() {
            return Err(AggregateError::NoProviders);
        }

        let mut sum = 0.0;
        for provider in &self.providers {
            sum += provider.temperature(city).await?;
        }

        Ok(sum / self.providers.len() as f64)
    }
}

impl std::fmt::Debug for MultiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiProvider")
            .field("providers", &self.names())
            .finish()
    }
}
