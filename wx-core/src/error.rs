//! Error taxonomy for a single weather lookup.
//!
//! Every variant is terminal for the current invocation; nothing here is
//! retried. The binary maps variants to exit codes.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// Malformed or missing user input.
    #[error("{0}")]
    Input(String),

    /// No API key could be resolved from any source.
    #[error(
        "API key is required. Provide it via --api-key or the OPENWEATHER_API_KEY environment variable."
    )]
    Credential,

    /// The zip code is not present in the reference table.
    #[error("ZipCode {zip} not found in database.")]
    ZipNotFound { zip: u32 },

    /// The provider answered 404 for the requested place.
    #[error("{place} not found. Please check the {what}.")]
    LocationNotFound { place: String, what: &'static str },

    /// The provider answered 401.
    #[error("Invalid API key. Please check your OpenWeatherMap API key.")]
    InvalidApiKey,

    /// DNS, connection or timeout failure before a response arrived.
    #[error("Error connecting to OpenWeatherMap API: {0}")]
    Transport(#[source] reqwest::Error),

    /// Any other non-success status.
    #[error("OpenWeatherMap request failed with status {status}: {body}")]
    Provider { status: StatusCode, body: String },

    /// A success response whose body is not the expected JSON.
    #[error("Failed to parse OpenWeatherMap response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The zip code table could not be parsed.
    #[error("Invalid zip code table at line {line}: {reason}")]
    ZipTable { line: usize, reason: String },

    /// Reading or writing a local file failed.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    pub(crate) fn table(line: usize, reason: impl Into<String>) -> Self {
        Self::ZipTable { line, reason: reason.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_not_found_names_the_zip() {
        let err = WeatherError::ZipNotFound { zip: 99999 };
        assert_eq!(err.to_string(), "ZipCode 99999 not found in database.");
    }

    #[test]
    fn location_not_found_mentions_not_found() {
        let err = WeatherError::LocationNotFound {
            place: "City 'Atlantis'".to_string(),
            what: "city name",
        };
        assert_eq!(err.to_string(), "City 'Atlantis' not found. Please check the city name.");
    }
}
