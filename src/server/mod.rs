//! HTTP front end.
//!
//! Serves `GET /weather/{city}` and answers with the averaged temperature as
//! JSON, or a plain-text 500 carrying the aggregation error.

use crate::analysis::{AggregateError, MultiProvider};
use crate::models::TemperatureReport;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    providers: Arc<MultiProvider>,
    sequential: bool,
}

impl AppState {
    pub fn new(providers: MultiProvider, sequential: bool) -> Self {
        Self {
            providers: Arc::new(providers),
            sequential,
        }
    }

    async fn temperature(&self, city: &str) -> Result<f64, AggregateError> {
        if self.sequential {
            self.providers.temperature_sequential(city).await
        } else {
            self.providers.temperature(city).await
        }
    }
}

/// Aggregation failure as seen by an HTTP client.
#[derive(Debug)]
pub struct ServerError(AggregateError);

impl From<AggregateError> for ServerError {
    fn from(err: AggregateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather/:city", get(weather))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ServerError> {
    let begin = Instant::now();
    let temp = state.temperature(&city).await?;
    let report = TemperatureReport::new(city, temp, begin.elapsed());

    Ok((
        [(header::CONTENT_TYPE, "application/json;charset=utf-8")],
        Json(report),
    )
        .into_response())
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::{Failing, Fixed};
    use crate::provider::WeatherProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(providers: Vec<Arc<dyn WeatherProvider>>) -> Router {
        router(AppState::new(MultiProvider::new(providers), false))
    }

    fn fixed(kelvin: f64) -> Arc<dyn WeatherProvider> {
        Arc::new(Fixed {
            kelvin,
            delay: Duration::ZERO,
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_weather_returns_average() {
        let app = app(vec![fixed(300.0), fixed(290.0), fixed(310.0)]);

        let (status, content_type, body) = get(app, "/weather/London").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json;charset=utf-8"));

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["city"], "London");
        assert_eq!(json["temp"], 300.0);
        assert!(json["took"].is_string());
    }

    #[tokio::test]
    async fn test_weather_decodes_city() {
        let app = app(vec![fixed(280.0)]);

        let (status, _, body) = get(app, "/weather/New%20York").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["city"], "New York");
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_with_message() {
        let app = app(vec![
            fixed(300.0),
            Arc::new(Failing {
                message: "service unavailable",
                delay: Duration::ZERO,
            }),
        ]);

        let (status, _, body) = get(app, "/weather/Paris").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "service unavailable");
    }

    #[tokio::test]
    async fn test_no_providers_is_500() {
        let (status, _, body) = get(app(Vec::new()), "/weather/Paris").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "no weather providers configured");
    }

    #[tokio::test]
    async fn test_missing_city_is_404() {
        let (status, _, _) = get(app(vec![fixed(1.0)]), "/weather/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sequential_mode_same_answer() {
        let state = AppState::new(MultiProvider::new(vec![fixed(270.0), fixed(280.0)]), true);

        let (status, _, body) = get(router(state), "/weather/Bern").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["temp"], 275.0);
    }
}
