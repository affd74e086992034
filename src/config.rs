use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::{CalendarError, Zone};
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Fixed UTC offset such as `-05:00`; the system zone is used when unset
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub colors: Colors,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

/// Board colors, as names (`cyan`), hex (`#RRGGBB`) or `rgb(r,g,b)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colors {
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_todo_color")]
    pub todo: String,
    #[serde(default = "default_in_progress_color")]
    pub in_progress: String,
    #[serde(default = "default_done_color")]
    pub done: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            timezone: None,
            upcoming_days: default_upcoming_days(),
            log_level: None,
            colors: Colors::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            accent: default_accent(),
            todo: default_todo_color(),
            in_progress: default_in_progress_color(),
            done: default_done_color(),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_upcoming_days() -> u32 {
    7
}

fn default_accent() -> String {
    "cyan".to_string()
}

fn default_todo_color() -> String {
    "blue".to_string()
}

fn default_in_progress_color() -> String {
    "yellow".to_string()
}

fn default_done_color() -> String {
    "green".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid timezone setting: {0}")]
    Timezone(#[from] CalendarError),
}

impl Config {
    /// Load configuration from the profile's config directory, creating it with defaults if
    /// missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from(&config_path, profile)
    }

    /// Load configuration from an explicit path, creating it with defaults if missing
    pub fn load_from(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            let mut config = Config {
                database_path: Self::default_database_path_for_profile(profile),
                ..Config::default()
            };
            config.save_to(config_path)?;
            tracing::info!(path = %config_path.display(), "created default config");
            Ok(config)
        }
    }

    pub fn save_to(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        match utils::get_data_dir(profile) {
            Some(data_dir) => data_dir.join("daybook.db").to_string_lossy().to_string(),
            None => format!("~/.local/share/{}/daybook.db", profile.app_name()),
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Zone used for every calendar-day computation
    pub fn zone(&self) -> Result<Zone, ConfigError> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") | Some("local") => Ok(Zone::Local),
            Some(offset) => Ok(Zone::parse_offset(offset)?),
        }
    }
}
