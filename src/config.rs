use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

const APP_DIR: &str = "estate-data";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Remote API base, including the `/api` prefix
    pub api_url: String,
    /// Where the local fallback store keeps its JSON files
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR),
        }
    }
}

impl Config {
    /// Defaults, then the TOML config file if present, then `ESTATE_*` env vars
    pub fn load() -> Result<Self> {
        let config = match config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            _ => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        Ok(config.with_overrides(
            env::var("ESTATE_API_URL").ok(),
            env::var("ESTATE_DATA_DIR").ok(),
        ))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config.normalized())
    }

    pub fn with_overrides(mut self, api_url: Option<String>, data_dir: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();
        self
    }
}

fn config_path() -> Option<PathBuf> {
    // 1. ESTATE_CONFIG env
    if let Ok(path) = env::var("ESTATE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    // 2. platform config dir
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
