use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    client::CurrentWeatherClient,
    request::{Language, QueryOptions, Unit},
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// language = "en"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Default unit system; the service default (standard) when absent.
    pub units: Option<Unit>,

    /// Default description language; the service default when absent.
    pub language: Option<Language>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "current-weather", "current-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Store the API key; blank input clears it.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then(|| api_key.trim().to_string());
    }

    /// API key from `env_value` if non-empty, else the stored one.
    pub fn api_key_with_env(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    /// API key, honoring [`API_KEY_ENV`].
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    pub fn is_configured(&self) -> bool {
        self.resolved_api_key().is_some()
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            unit: self.units,
            language: self.language.clone(),
        }
    }
}

/// Construct a client from the resolved API key.
pub fn client_from_config(config: &Config) -> Result<CurrentWeatherClient> {
    client_for_key(config.resolved_api_key())
}

fn client_for_key(api_key: Option<String>) -> Result<CurrentWeatherClient> {
    let api_key = api_key.ok_or_else(|| {
        anyhow!(
            "No API key configured.\n\
             Hint: run `current-weather configure` or set {API_KEY_ENV}."
        )
    })?;

    Ok(CurrentWeatherClient::new(api_key)?)
}
