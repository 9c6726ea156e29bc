use serde::Deserialize;
use std::{env, fs, path::Path};

use crate::page::DEFAULT_BRAND;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen_port: Option<u16>,
    pub dev_cors_origin: Option<String>,
    pub db_path: Option<String>,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub brand: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            brand: DEFAULT_BRAND.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AppConfig {
    /// Loads `CONFIG_PATH`, or `config.yaml` when unset. A missing default
    /// file yields the built-in defaults; an explicit path must exist.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("CONFIG_PATH") {
            Ok(path) => Self::load_from_path(path),
            Err(_) if !Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file; using defaults");
                Ok(Self::default())
            }
            Err(_) => Self::load_from_path(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let cfg: AppConfig = serde_yaml::from_str(&text)?;
        Ok(cfg)
    }
}
