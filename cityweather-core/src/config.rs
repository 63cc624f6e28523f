use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::source::SourceId;

/// Credentials and endpoint for a single upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// GeoNames username or OpenWeather API key.
    pub credential: String,

    /// Overrides the public endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [sources.geonames]
    /// credential = "..."
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,
}

impl Config {
    /// Load config from disk (empty if missing), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        Ok(cfg.with_overrides(|name| std::env::var(name).ok()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace credentials with values from the environment where set.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for id in SourceId::all() {
            if let Some(value) = lookup(id.env_var()).filter(|v| !v.trim().is_empty()) {
                self.upsert_credential(*id, value);
            }
        }
        self
    }

    /// Set or replace a credential, keeping any configured base URL.
    pub fn upsert_credential(&mut self, id: SourceId, credential: String) {
        self.sources
            .entry(id.as_str().to_string())
            .and_modify(|cfg| cfg.credential = credential.clone())
            .or_insert(SourceConfig { credential, base_url: None });
    }

    pub fn source_config(&self, id: SourceId) -> Option<&SourceConfig> {
        self.sources.get(id.as_str())
    }

    pub fn credential(&self, id: SourceId) -> Option<&str> {
        self.source_config(id).map(|cfg| cfg.credential.as_str())
    }

    pub fn base_url(&self, id: SourceId) -> Option<&str> {
        self.source_config(id).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_configured(&self, id: SourceId) -> bool {
        self.credential(id).is_some()
    }
}
