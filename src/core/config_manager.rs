// src/core/config_manager.rs
//! Unified configuration: config.yaml sections plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_SERP_API_URL: &str = "https://serpapi.com/search.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigManager {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub storage: StorageBackend,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/careerai.db"),
            snapshot_path: PathBuf::from("data/snapshots"),
            log_file: None,
            storage: StorageBackend::Sqlite,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub serp_api_key: Option<String>,
    pub serp_api_url: String,
    pub search_timeout_seconds: u64,
    pub ai_timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            serp_api_key: None,
            serp_api_url: DEFAULT_SERP_API_URL.to_string(),
            search_timeout_seconds: 15,
            ai_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub default_location: String,
    pub default_limit: usize,
    /// Raises the description bar; values below 50 are treated as 50
    pub min_description_len: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_location: "Pakistan".to_string(),
            default_limit: 20,
            min_description_len: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: Option<ConfigManager>,
    production: Option<ConfigManager>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            service: ServiceConfig::default(),
            discovery: DiscoveryConfig::default(),
            server: ServerSettings::default(),
        }
    }
}

impl ConfigManager {
    /// Load the section for the current environment, then apply env overrides
    pub fn load(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml(&content, &environment)?
        } else {
            warn!(
                "{} not found, using built-in defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.resolve_paths()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse configuration YAML")?;

        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        Ok(section.unwrap_or_default())
    }

    fn get_environment() -> String {
        std::env::var("CAREERAI_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.service.gemini_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.service.gemini_model = model;
        }
        if let Ok(key) = std::env::var("SERP_API_KEY") {
            self.service.serp_api_key = Some(key);
        }
        if let Ok(path) = std::env::var("CAREERAI_DATABASE") {
            self.environment.database_path = PathBuf::from(path);
        }
        match std::env::var("ROCKET_PORT").map(|p| p.parse::<u16>()) {
            Ok(Ok(port)) => self.server.port = port,
            Ok(Err(_)) => warn!("ROCKET_PORT is not a valid port number, keeping {}", self.server.port),
            Err(_) => {}
        }
    }

    fn resolve_paths(&mut self) -> Result<()> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        let resolve = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                current_dir.join(path)
            }
        };

        self.environment.database_path = resolve(&self.environment.database_path);
        self.environment.snapshot_path = resolve(&self.environment.snapshot_path);
        self.environment.log_file = self.environment.log_file.as_ref().map(resolve);
        Ok(())
    }

    /// Ensure all required directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        use crate::core::FsOps;

        FsOps::ensure_dir_exists(&self.environment.snapshot_path).await?;
        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }
        Ok(())
    }
}
