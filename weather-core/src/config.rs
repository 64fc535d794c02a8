use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
pub const API_KEY_ENV: &str = "OPENWEATHERAPI_KEY";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Telegram Bot API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    /// Server-side wait of a single `getUpdates` long poll.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self { bot_token: None, poll_timeout_secs: 60 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: String,
    pub lang: String,
    pub geocode_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for OpenWeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            units: "metric".to_string(),
            lang: "ru".to_string(),
            geocode_limit: 5,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { url: "sqlite://weather-bot.db".to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [telegram]
/// bot_token = "..."
///
/// [openweather]
/// api_key = "..."
///
/// [database]
/// url = "sqlite://weather-bot.db"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramSettings,
    pub openweather: OpenWeatherSettings,
    pub database: DatabaseSettings,
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
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-bot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override file values with whatever `lookup` returns for the known variable names.
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(BOT_TOKEN_ENV) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = get(API_KEY_ENV) {
            self.openweather.api_key = Some(key);
        }
        if let Some(url) = get(DATABASE_URL_ENV) {
            self.database.url = url;
        }
    }

    pub fn require_bot_token(&self) -> Result<&str> {
        self.telegram.bot_token.as_deref().ok_or_else(|| {
            anyhow!(
                "No Telegram bot token configured (set {BOT_TOKEN_ENV}).\n\
                 Hint: run `weather-bot configure` and enter your bot token."
            )
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.openweather.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured (set {API_KEY_ENV}).\n\
                 Hint: run `weather-bot configure` and enter your API key."
            )
        })
    }
}
