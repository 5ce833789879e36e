use crate::errors::{ConfidanteError, ConfidanteResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub greeting: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5555".to_string(),
            greeting: "Hey, you're back! I missed you~ What's on your mind?".to_string(),
            log_level: "info".to_string(),
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

pub fn initialize_config() -> ConfidanteResult<()> {
    let config_path = get_config_path()?;

    // If config exists, load it
    if config_path.exists() {
        let config_str = fs::read_to_string(&config_path)
            .map_err(|e| ConfidanteError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| ConfidanteError::config_error(format!("Failed to parse config: {}", e)))?;

        validate_config(&config)?;

        *CONFIG.write().unwrap() = config;
    } else {
        // Create default config, letting the environment pick the server
        let mut config = Config::default();

        if let Ok(url) = dotenv::var("COMPANION_SERVER_URL") {
            config.server_url = url;
        }

        validate_config(&config)?;

        let parent = config_path
            .parent()
            .ok_or_else(|| ConfidanteError::config_error("Config path has no parent directory"))?;
        fs::create_dir_all(parent)
            .map_err(|e| ConfidanteError::config_error(format!("Failed to create config directory: {}", e)))?;

        let config_str = serde_json::to_string_pretty(&config)
            .map_err(|e| ConfidanteError::config_error(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, config_str)
            .map_err(|e| ConfidanteError::config_error(format!("Failed to write config file: {}", e)))?;

        *CONFIG.write().unwrap() = config;
    }

    Ok(())
}

fn get_config_path() -> ConfidanteResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ConfidanteError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("confidante").join("config.json"))
}

fn validate_config(config: &Config) -> ConfidanteResult<()> {
    if config.server_url.is_empty() {
        return Err(ConfidanteError::config_error("Server URL is required"));
    }

    if !config.server_url.starts_with("http://") && !config.server_url.starts_with("https://") {
        return Err(ConfidanteError::config_error(
            "Server URL must start with http:// or https://",
        ));
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(ConfidanteError::config_error(format!(
            "Unknown log level: {}",
            config.log_level
        )));
    }

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG.read().unwrap().clone()
}
