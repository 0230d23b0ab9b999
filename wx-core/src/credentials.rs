//! API key resolution and persistence.
//!
//! Resolution order is fixed: explicit flag, then environment, then the
//! persisted credentials file. Nothing is validated locally; the provider is
//! the only judge of whether a key works.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::WeatherError;

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Older name, still honoured when the primary variable is unset.
pub const LEGACY_API_KEY_ENV: &str = "WEATHER_API_KEY";

const KEY_VARS: [&str; 2] = [API_KEY_ENV, LEGACY_API_KEY_ENV];

/// Opaque provider credential. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Flag,
    Environment(&'static str),
    File(PathBuf),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Flag => f.write_str("--api-key"),
            KeySource::Environment(var) => write!(f, "environment variable {var}"),
            KeySource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Key=value file holding the last key passed with `--api-key`.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted key. A missing file is not an error.
    pub fn load(&self) -> Result<Option<ApiKey>, WeatherError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path).map_err(|e| WeatherError::io(&self.path, e))?;
        Ok(parse_key_file(&text))
    }

    /// Overwrite the file wholesale with `key`.
    pub fn save(&self, key: &ApiKey) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| WeatherError::io(parent, e))?;
        }

        fs::write(&self.path, format!("{API_KEY_ENV}={}\n", key.expose()))
            .map_err(|e| WeatherError::io(&self.path, e))?;

        tracing::info!(path = %self.path.display(), "saved API key");
        Ok(())
    }
}

fn parse_key_file(text: &str) -> Option<ApiKey> {
    let mut found: [Option<ApiKey>; KEY_VARS.len()] = Default::default();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if let Some(slot) = KEY_VARS.iter().position(|name| *name == k.trim()) {
            found[slot] = ApiKey::new(strip_quotes(v));
        }
    }

    found.into_iter().flatten().next()
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')));
    if quoted { &s[1..s.len() - 1] } else { s }
}

/// Resolve the key from the process environment.
pub fn resolve_api_key(
    flag: Option<&str>,
    store: &CredentialStore,
) -> Result<(ApiKey, KeySource), WeatherError> {
    resolve_api_key_with(flag, |name| std::env::var(name).ok(), store)
}

/// Resolve the key with an injected environment lookup.
pub fn resolve_api_key_with<F>(
    flag: Option<&str>,
    env: F,
    store: &CredentialStore,
) -> Result<(ApiKey, KeySource), WeatherError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = flag {
        let key = ApiKey::new(value).ok_or_else(|| {
            WeatherError::Input("--api-key flag provided but no key found.".to_string())
        })?;
        return Ok((key, KeySource::Flag));
    }

    for var in KEY_VARS {
        if let Some(key) = env(var).and_then(ApiKey::new) {
            return Ok((key, KeySource::Environment(var)));
        }
    }

    if let Some(key) = store.load()? {
        return Ok((key, KeySource::File(store.path().to_path_buf())));
    }

    Err(WeatherError::Credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("credentials"))
    }

    #[test]
    fn flag_wins_over_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&ApiKey::new("FILE").unwrap()).unwrap();

        let (key, source) =
            resolve_api_key_with(Some("FLAG"), |_| Some("ENV".into()), &store).unwrap();

        assert_eq!(key.expose(), "FLAG");
        assert_eq!(source, KeySource::Flag);
    }

    #[test]
    fn env_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&ApiKey::new("FILE").unwrap()).unwrap();

        let env: HashMap<&str, String> = [(LEGACY_API_KEY_ENV, "LEGACY".to_string())].into();
        let (key, source) =
            resolve_api_key_with(None, |name| env.get(name).cloned(), &store).unwrap();

        assert_eq!(key.expose(), "LEGACY");
        assert_eq!(source, KeySource::Environment(LEGACY_API_KEY_ENV));
    }

    #[test]
    fn primary_env_var_wins_over_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let env: HashMap<&str, String> = [
            (API_KEY_ENV, "PRIMARY".to_string()),
            (LEGACY_API_KEY_ENV, "LEGACY".to_string()),
        ]
        .into();

        let (key, _) =
            resolve_api_key_with(None, |name| env.get(name).cloned(), &store_in(&dir)).unwrap();
        assert_eq!(key.expose(), "PRIMARY");
    }

    #[test]
    fn blank_env_falls_through_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&ApiKey::new("FILE").unwrap()).unwrap();

        let (key, source) = resolve_api_key_with(None, |_| Some("  ".into()), &store).unwrap();

        assert_eq!(key.expose(), "FILE");
        assert_eq!(source, KeySource::File(store.path().to_path_buf()));
    }

    #[test]
    fn nothing_resolvable_is_credential_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_api_key_with(None, no_env, &store_in(&dir)).unwrap_err();
        assert!(matches!(err, WeatherError::Credential));
    }

    #[test]
    fn empty_flag_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_api_key_with(Some(""), no_env, &store_in(&dir)).unwrap_err();
        assert!(matches!(err, WeatherError::Input(_)));
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "OTHER=1\nOPENWEATHER_API_KEY=old\n").unwrap();

        store.save(&ApiKey::new("new").unwrap()).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "OPENWEATHER_API_KEY=new\n");
        assert_eq!(store.load().unwrap().unwrap().expose(), "new");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested/wx/credentials"));
        store.save(&ApiKey::new("K").unwrap()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn key_file_accepts_dotenv_style() {
        let text = "# comment\n\nexport WEATHER_API_KEY='legacy'\nOPENWEATHER_API_KEY = \"main\"\n";
        assert_eq!(parse_key_file(text).unwrap().expose(), "main");
        assert_eq!(parse_key_file("WEATHER_API_KEY=legacy").unwrap().expose(), "legacy");
        assert!(parse_key_file("UNRELATED=1").is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let key = ApiKey::new("secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }
}
