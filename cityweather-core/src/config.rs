use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Cities shown when the caller does not name any.
pub const DEFAULT_CITIES: [&str; 10] = [
    "Stockholm",
    "Gothenburg",
    "Malmö",
    "Umeå",
    "London",
    "Paris",
    "Berlin",
    "Madrid",
    "Rome",
    "Amsterdam",
];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_cities = ["Stockholm", "Oslo"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Used when the API key environment variable is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the environment variable consulted for the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_cities: Vec<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn default_cities(&self) -> Vec<String> {
        if self.default_cities.is_empty() {
            DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()
        } else {
            self.default_cities.clone()
        }
    }

    pub fn key_source(&self) -> ApiKeySource {
        ApiKeySource::new(
            Some(self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)),
            self.api_key.clone(),
        )
    }
}

/// Where the provider credential comes from.
///
/// Resolved on every request, so a key exported after startup is picked up.
#[derive(Debug, Clone, Default)]
pub struct ApiKeySource {
    env_var: Option<String>,
    configured: Option<String>,
}

impl ApiKeySource {
    pub fn new(env_var: Option<&str>, configured: Option<String>) -> Self {
        Self {
            env_var: env_var.map(str::to_string),
            configured,
        }
    }

    /// A key that never changes; mostly for tests and embedding.
    pub fn fixed(api_key: impl Into<String>) -> Self {
        Self::new(None, Some(api_key.into()))
    }

    pub fn env_var(&self) -> &str {
        self.env_var.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    /// Environment variable first, then the configured value. Empty strings count as absent.
    pub fn resolve(&self) -> Option<String> {
        self.env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.configured.clone().filter(|key| !key.trim().is_empty()))
    }
}
