//! Core library for the `wx` CLI.
//!
//! This crate defines:
//! - Zip code and city resolution against a bundled reference table
//! - A single-request client for the OpenWeatherMap current-conditions endpoint
//! - Formatting of readings into the report block
//! - Configuration & credentials handling
//!
//! It is used by `wx-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod format;
pub mod location;
pub mod model;
pub mod units;
pub mod zip_table;

pub use client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, WeatherClient};
pub use config::{Config, ConfigPaths};
pub use credentials::{ApiKey, CredentialStore, KeySource, resolve_api_key};
pub use error::WeatherError;
pub use format::format_weather;
pub use location::{Location, LocationQuery, LocationResolver, WeatherTarget};
pub use model::CurrentConditions;
pub use units::Units;
pub use zip_table::ZipTable;
