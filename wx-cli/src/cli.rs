use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, ValueEnum};
use wx_core::{
    Config, ConfigPaths, DEFAULT_ENDPOINT, KeySource, LocationQuery, LocationResolver, Units,
    WeatherClient, WeatherTarget, ZipTable, format_weather, resolve_api_key,
};

const AFTER_HELP: &str = "\
Examples:
  wx 28277
  wx London
  wx \"New York\" --units imperial
  wx --api-key YOUR_API_KEY

API Key:
  Resolved from --api-key, then OPENWEATHER_API_KEY, then the key saved by the
  last --api-key run. Get a free key at: https://openweathermap.org/api";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "wx",
    version,
    about = "Current weather by zip code or city name",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Zip code (all digits) or city name.
    #[arg(value_name = "LOCATION")]
    pub location: Vec<String>,

    /// OpenWeatherMap API key; saved for future runs.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Units of measurement [default: metric].
    #[arg(long, value_enum)]
    pub units: Option<UnitsArg>,

    /// CSV zip code table to use instead of the bundled one.
    #[arg(long, value_name = "PATH")]
    pub zip_table: Option<PathBuf>,

    /// Provider endpoint override.
    #[arg(long, env = "WX_ENDPOINT", hide = true)]
    pub endpoint: Option<String>,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitsArg {
    /// Celsius, m/s
    Metric,
    /// Fahrenheit, mph
    Imperial,
    /// Kelvin, m/s
    Standard,
}

impl From<UnitsArg> for Units {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
            UnitsArg::Standard => Units::Standard,
        }
    }
}

impl Cli {
    /// Positional words joined, so `wx New York` works without quotes.
    fn location(&self) -> Option<String> {
        let joined = self.location.join(" ");
        if joined.trim().is_empty() { None } else { Some(joined) }
    }

    pub async fn run(self) -> Result<()> {
        let location = self.location();
        if location.is_none() && self.api_key.is_none() {
            Cli::command().print_help()?;
            return Ok(());
        }

        let paths = ConfigPaths::discover()?;
        let store = paths.credentials();

        // Saving a key needs only the credentials path, not a valid config.toml.
        let Some(location) = location else {
            let (key, _) = resolve_api_key(self.api_key.as_deref(), &store)?;
            store.save(&key)?;
            println!(
                "API key saved to {}, you can use it in future runs without providing it again.",
                store.path().display()
            );
            return Ok(());
        };

        let config = Config::load(&paths)?;
        let query = LocationQuery::parse(&location)?;
        let target = match &query {
            LocationQuery::Zip(zip) => {
                tracing::info!(zip, "fetching weather for zip code");
                LocationResolver::new(self.zip_table(&config)?).resolve(&query)?
            }
            LocationQuery::City(_) => LocationResolver::new(ZipTable::default()).resolve(&query)?,
        };

        let (key, source) = resolve_api_key(self.api_key.as_deref(), &store)?;
        tracing::debug!(%source, "using API key");
        if source == KeySource::Flag {
            store.save(&key)?;
        }

        let units = self.units.map(Units::from).or(config.units).unwrap_or_default();
        let endpoint = self
            .endpoint
            .clone()
            .or_else(|| config.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let client = WeatherClient::new(key).with_endpoint(endpoint).with_timeout(config.timeout());
        let mut reading = client.fetch(&target, units).await?;

        if let WeatherTarget::Coordinates(loc) = &target {
            reading.relabel(loc);
        }

        println!("{}", format_weather(&reading, units));
        Ok(())
    }

    fn zip_table(&self, config: &Config) -> Result<ZipTable> {
        let table = match self.zip_table.as_ref().or(config.zip_table.as_ref()) {
            Some(path) => ZipTable::load(path)?,
            None => ZipTable::bundled()?,
        };
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn multi_word_city_is_joined() {
        let cli = Cli::parse_from(["wx", "New", "York", "--units", "imperial"]);
        assert_eq!(cli.location().as_deref(), Some("New York"));
        assert_eq!(cli.units, Some(UnitsArg::Imperial));
    }

    #[test]
    fn no_location_is_none() {
        let cli = Cli::parse_from(["wx", "--api-key", "KEY"]);
        assert!(cli.location().is_none());
        assert_eq!(cli.api_key.as_deref(), Some("KEY"));
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert!(Cli::try_parse_from(["wx", "London", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn units_arg_maps_to_core_units() {
        assert_eq!(Units::from(UnitsArg::Metric), Units::Metric);
        assert_eq!(Units::from(UnitsArg::Imperial), Units::Imperial);
        assert_eq!(Units::from(UnitsArg::Standard), Units::Standard);
    }
}
