use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{ApiKey, CurrentConditions, Units, WeatherError, WeatherTarget};

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Single-shot client for the OpenWeatherMap current-conditions endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: ApiKey,
    endpoint: String,
    timeout: Duration,
    http: Client,
}

impl WeatherClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch current conditions. One attempt, bounded by the timeout.
    pub async fn fetch(
        &self,
        target: &WeatherTarget,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        let mut query: Vec<(&str, String)> = match target {
            WeatherTarget::Coordinates(loc) => vec![
                ("lat", loc.latitude.to_string()),
                ("lon", loc.longitude.to_string()),
            ],
            WeatherTarget::City(name) => vec![("q", name.clone())],
        };
        query.push(("appid", self.api_key.expose().to_string()));
        query.push(("units", units.as_str().to_string()));

        tracing::debug!(
            endpoint = %self.endpoint,
            target = %target.describe(),
            %units,
            "requesting current conditions"
        );

        let res = self
            .http
            .get(&self.endpoint)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::Transport)?;

        tracing::debug!(%status, bytes = body.len(), "provider responded");

        let reading = interpret_response(status, &body, target)?;
        if let Some(observed) = reading.observed_at() {
            tracing::debug!(%observed, "observation time");
        }

        Ok(reading)
    }
}

/// Map a provider response onto a reading or a domain error.
pub fn interpret_response(
    status: StatusCode,
    body: &str,
    target: &WeatherTarget,
) -> Result<CurrentConditions, WeatherError> {
    match status {
        s if s.is_success() => Ok(serde_json::from_str(body)?),
        StatusCode::UNAUTHORIZED => Err(WeatherError::InvalidApiKey),
        StatusCode::NOT_FOUND => Err(WeatherError::LocationNotFound {
            place: target.describe(),
            what: match target {
                WeatherTarget::City(_) => "city name",
                WeatherTarget::Coordinates(_) => "coordinates",
            },
        }),
        _ => Err(WeatherError::Provider { status, body: truncate_body(body) }),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
