use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE, HTTP_REQUEST_TIMEOUT_SECS, SESSION_FILE_NAME,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the session is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Listing defaults
    #[serde(default)]
    pub listing: ListingConfig,
}

/// Backend API configuration
///
/// Every endpoint, auth included, hangs off `base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the session file (defaults to the per-user data dir)
    pub dir: Option<PathBuf>,
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_name: SESSION_FILE_NAME.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve the full path of the session file
    pub fn session_path(&self) -> Result<PathBuf> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => get_data_dir()?,
        };
        Ok(dir.join(&self.file_name))
    }
}

/// Listing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Events per page
    pub page_size: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(".eventhub/config.toml");
    load_config_from(&[global_config, local_config])
}

/// Layer defaults, the given TOML files (later wins) and `EVENTHUB_` env vars
pub fn load_config_from(files: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // EVENTHUB_API__BASE_URL -> api.base_url
    figment = figment.merge(Env::prefixed("EVENTHUB_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Load a single explicit config file on top of the defaults
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file {} does not exist", path.display());
    }
    load_config_from(&[path.to_path_buf()])
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "eventhub") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        let config_dir = home_dir()?.join(".config").join("eventhub");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Get the data directory that holds the persisted session
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "eventhub") {
        Ok(proj_dirs.data_dir().to_path_buf())
    } else {
        Ok(home_dir()?.join(".local").join("share").join("eventhub"))
    }
}

fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .context("Could not determine home directory")
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    // Create example local config
    let local_example = PathBuf::from(".eventhub/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# EventHub Project Configuration
# This file overrides global settings for this directory

[api]
base_url = "http://localhost:5000/api"
timeout_secs = 30

[listing]
page_size = 6
"#;
        std::fs::write(&local_example, example_config)?;
    }

    Ok(config_file)
}
