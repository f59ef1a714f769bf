//! Application-level configuration: JSON file defaults overlaid with environment variables.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::slides::google::ServiceAccountKey;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_BACK_CONFIG_PATH";
/// Service account JSON document, as the hosted deployment provides it.
const SERVICE_ACCOUNT_KEY_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";
/// Path to a service account JSON file.
const SERVICE_ACCOUNT_KEY_PATH_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_KEY_PATH";

const DEFAULT_DATABASE_URL: &str = "sqlite://trivia.db?mode=rwc";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Random draws before session creation gives up on finding a free code.
pub const DEFAULT_ALLOCATION_ATTEMPTS: u32 = 100;

/// Where the presentation provider credential comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Raw JSON key held in memory.
    Inline(String),
    /// JSON key file on disk.
    File(PathBuf),
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// `sqlite:` or `postgres://` connection URL.
    pub database_url: String,
    /// Upper bound of the database pool.
    pub max_connections: u32,
    /// HTTP listen port.
    pub port: u16,
    /// Random draws per session code allocation.
    pub allocation_attempts: u32,
    /// Override of the Slides REST endpoint, mostly for local fakes.
    pub slides_api_base_url: Option<String>,
    /// Service account credential; slide routes are disabled without one.
    pub credential: Option<CredentialSource>,
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file(&resolve_config_path());
        config.apply_env(|key| env::var(key).ok());
        config
    }

    fn load_file(path: &PathBuf) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Overlay values read through `lookup`. Unparseable numbers are ignored with a warning.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty("DATABASE_URL") {
            self.database_url = url;
        }

        if let Some(raw) = non_empty("PORT").or_else(|| non_empty("SERVER_PORT")) {
            match raw.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!(value = %raw, "ignoring invalid port"),
            }
        }

        if let Some(raw) = non_empty("DATABASE_MAX_CONNECTIONS") {
            match raw.parse() {
                Ok(max) => self.max_connections = max,
                Err(_) => warn!(value = %raw, "ignoring invalid DATABASE_MAX_CONNECTIONS"),
            }
        }

        if let Some(json) = non_empty(SERVICE_ACCOUNT_KEY_ENV) {
            self.credential = Some(CredentialSource::Inline(json));
        } else if let Some(path) = non_empty(SERVICE_ACCOUNT_KEY_PATH_ENV) {
            self.credential = Some(CredentialSource::File(PathBuf::from(path)));
        }
    }

    /// Resolve and parse the configured service account key, if any.
    pub fn service_account_key(&self) -> anyhow::Result<Option<ServiceAccountKey>> {
        let raw = match &self.credential {
            None => return Ok(None),
            Some(CredentialSource::Inline(json)) => json.clone(),
            Some(CredentialSource::File(path)) => fs::read_to_string(path).map_err(|err| {
                anyhow::anyhow!("reading service account key {}: {err}", path.display())
            })?,
        };
        Ok(Some(ServiceAccountKey::from_json(&raw)?))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            port: DEFAULT_PORT,
            allocation_attempts: DEFAULT_ALLOCATION_ATTEMPTS,
            slides_api_base_url: None,
            credential: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    database_url: Option<String>,
    max_connections: Option<u32>,
    port: Option<u16>,
    allocation_attempts: Option<u32>,
    slides_api_base_url: Option<String>,
    service_account_key_path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            database_url: value.database_url.unwrap_or(defaults.database_url),
            max_connections: value.max_connections.unwrap_or(defaults.max_connections),
            port: value.port.unwrap_or(defaults.port),
            allocation_attempts: value
                .allocation_attempts
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.allocation_attempts),
            slides_api_base_url: value.slides_api_base_url,
            credential: value.service_account_key_path.map(CredentialSource::File),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_fill_missing_fields_with_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "port": 9000, "allocationAttempts": 0 }"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.allocation_attempts, DEFAULT_ALLOCATION_ATTEMPTS);
        assert!(config.credential.is_none());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[
            ("DATABASE_URL", "postgres://localhost/trivia"),
            ("SERVER_PORT", "3000"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            (SERVICE_ACCOUNT_KEY_PATH_ENV, "/etc/key.json"),
        ]));

        assert_eq!(config.database_url, "postgres://localhost/trivia");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 12);
        assert_eq!(
            config.credential,
            Some(CredentialSource::File(PathBuf::from("/etc/key.json")))
        );
    }

    #[test]
    fn inline_key_wins_over_key_path() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[
            (SERVICE_ACCOUNT_KEY_ENV, "{}"),
            (SERVICE_ACCOUNT_KEY_PATH_ENV, "/etc/key.json"),
        ]));
        assert_eq!(config.credential, Some(CredentialSource::Inline("{}".into())));
    }

    #[test]
    fn invalid_numbers_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[("PORT", "eighty"), ("DATABASE_MAX_CONNECTIONS", "")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn no_credential_means_no_key() {
        assert!(AppConfig::default().service_account_key().unwrap().is_none());
    }
}
