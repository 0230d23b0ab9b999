use serde::{Deserialize, Serialize};

use crate::{WeatherError, ZipTable};

/// A resolved row of the zip code table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub zip: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    /// Two-letter state code, e.g. "NC".
    pub region_code: String,
    pub region_name: String,
}

/// What the user typed, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    Zip(u32),
    City(String),
}

impl LocationQuery {
    /// An all-digit token is a zip code; anything else is a city name.
    pub fn parse(input: &str) -> Result<Self, WeatherError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(WeatherError::Input("Location must not be empty.".to_string()));
        }

        if input.bytes().all(|b| b.is_ascii_digit()) {
            let zip = input
                .parse::<u32>()
                .map_err(|_| WeatherError::Input(format!("Invalid zip code '{input}'.")))?;
            return Ok(LocationQuery::Zip(zip));
        }

        Ok(LocationQuery::City(input.to_string()))
    }
}

/// What the weather client queries the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherTarget {
    Coordinates(Location),
    City(String),
}

impl WeatherTarget {
    /// Human-readable description used in logs and not-found errors.
    pub fn describe(&self) -> String {
        match self {
            WeatherTarget::Coordinates(loc) => {
                format!("Location ({}, {})", loc.latitude, loc.longitude)
            }
            WeatherTarget::City(name) => format!("City '{name}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    table: ZipTable,
}

impl LocationResolver {
    pub fn new(table: ZipTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, query: &LocationQuery) -> Result<WeatherTarget, WeatherError> {
        match query {
            LocationQuery::Zip(zip) => {
                let loc = self
                    .table
                    .lookup(*zip)
                    .cloned()
                    .ok_or(WeatherError::ZipNotFound { zip: *zip })?;

                tracing::info!(
                    zip,
                    place = %loc.place_name,
                    region = %loc.region_code,
                    region_name = %loc.region_name,
                    lat = loc.latitude,
                    lon = loc.longitude,
                    "resolved zip code"
                );
                Ok(WeatherTarget::Coordinates(loc))
            }
            LocationQuery::City(name) => Ok(WeatherTarget::City(name.clone())),
        }
    }
}
