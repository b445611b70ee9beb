use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

/// Public OpenWeatherMap endpoint root, offered as the default by `weather configure`.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const API_KEY_NAME: &str = "OpenWeatherMap:ApiKey";
const BASE_URL_NAME: &str = "OpenWeatherMap:BaseUrl";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["OPENWEATHERMAP_API_KEY", "OpenWeatherMap__ApiKey"];

/// Environment variables checked for the base URL, in order.
pub const BASE_URL_VARS: &[&str] = &["OPENWEATHERMAP_BASE_URL", "OpenWeatherMap__BaseUrl"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "OpenWeatherMap section missing in configuration.\n\
         Hint: set OPENWEATHERMAP_API_KEY and OPENWEATHERMAP_BASE_URL (a .env file works too), \
         or run `weather configure`."
    )]
    MissingSection,

    #[error("{0} not configured.")]
    Missing(&'static str),

    #[error("{0} is blank.")]
    Blank(&'static str),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file: {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration to TOML")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The `[OpenWeatherMap]` table of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Settings file stored on disk.
///
/// Example TOML:
/// [OpenWeatherMap]
/// api_key = "..."
/// base_url = "https://api.openweathermap.org/data/2.5"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(rename = "OpenWeatherMap", default, skip_serializing_if = "Option::is_none")]
    pub open_weather_map: Option<SectionConfig>,
}

impl FileConfig {
    /// Path to the settings file in the platform config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs =
            ProjectDirs::from("dev", "owm-client", "weather").ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load the file, or return an empty config if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Save to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Write { path: parent.to_path_buf(), source })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    pub fn set_credentials(&mut self, base_url: String, api_key: String) {
        self.open_weather_map = Some(SectionConfig {
            api_key: Some(api_key),
            base_url: Some(base_url),
        });
    }
}

/// Validated connection settings for the weather API.
///
/// Built once at startup and handed to the client; nothing reads configuration
/// after that.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    base_url: String,
    api_key: String,
}

impl Settings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = require(BASE_URL_NAME, Some(base_url.into()))?;
        let api_key = require(API_KEY_NAME, Some(api_key.into()))?;
        validate_base_url(&base_url)?;

        Ok(Self { base_url, api_key })
    }

    /// Load settings from the process environment, an optional `.env` file in
    /// the working directory, and the settings file.
    ///
    /// Variables already present in the environment are not overridden by
    /// `.env`, and environment values win over the settings file.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(err) => debug!(%err, "no .env file loaded"),
        }

        let file = match FileConfig::default_path() {
            Ok(path) => {
                debug!(path = %path.display(), "reading settings file");
                FileConfig::load_from(&path)?
            }
            Err(err) => {
                debug!(%err, "skipping settings file");
                FileConfig::default()
            }
        };

        Self::resolve(|name| std::env::var(name).ok(), &file)
    }

    /// Combine an environment lookup with a settings file.
    pub fn resolve<F>(env: F, file: &FileConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = file.open_weather_map.clone().unwrap_or_default();

        let api_key = lookup(&env, API_KEY_VARS).or(section.api_key);
        let base_url = lookup(&env, BASE_URL_VARS).or(section.base_url);

        if api_key.is_none() && base_url.is_none() {
            return Err(ConfigError::MissingSection);
        }

        let base_url = require(BASE_URL_NAME, base_url)?;
        let api_key = require(API_KEY_NAME, api_key)?;
        validate_base_url(&base_url)?;

        Ok(Self { base_url, api_key })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn lookup<F>(env: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names.iter().find_map(|name| env(name))
}

fn require(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::Blank(name));
    }

    Ok(trimmed.to_string())
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: raw.to_string(), reason };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
