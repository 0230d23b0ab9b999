use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{DEFAULT_TIMEOUT, Units, credentials::CredentialStore};

/// Environment variable that relocates the whole config directory.
pub const CONFIG_DIR_ENV: &str = "WX_CONFIG_DIR";

/// Optional settings stored on disk.
///
/// Example TOML:
/// ```toml
/// units = "imperial"
/// zip_table = "/home/me/Zip-Code.csv"
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Units used when `--units` is not given.
    pub units: Option<Units>,
    /// CSV used instead of the bundled zip table.
    pub zip_table: Option<PathBuf>,
    /// Provider endpoint override.
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let path = paths.config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if cfg.timeout_secs == Some(0) {
            bail!("Invalid config file {}: timeout_secs must be greater than zero", path.display());
        }

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Locations of the files the CLI reads and writes.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `WX_CONFIG_DIR` if set, otherwise the platform config directory.
    pub fn discover() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::new(dir));
        }

        let dirs = ProjectDirs::from("dev", "wx", "wx")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(Self::new(dirs.config_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join("config.toml")
    }

    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.dir.join("credentials"))
    }
}
