//! Configuration Management
//!
//! Handles persistent configuration storage for holonet.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// API root used when nothing else is configured
pub const DEFAULT_API_URI: &str = "https://swapi.dev/api";

/// Environment variable overriding the configured API root
pub const API_URI_ENV: &str = "HOLONET_API_URI";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API root, without a trailing slash
    #[serde(default)]
    pub api_uri: Option<String>,
    /// Parallel requests per reference field
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Follow `next` links when listing
    #[serde(default)]
    pub follow_pages: Option<bool>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("holonet").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file; missing or malformed files
    /// yield the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective API root (env > config > default)
    pub fn effective_api_uri(&self) -> String {
        let env = std::env::var(API_URI_ENV).ok().filter(|v| !v.trim().is_empty());
        Self::pick_api_uri(env, self.api_uri.clone())
    }

    fn pick_api_uri(env: Option<String>, configured: Option<String>) -> String {
        env.or(configured)
            .map(|uri| uri.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URI.to_string())
    }

    /// Get effective concurrency (config > default), never zero
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency
            .filter(|n| *n > 0)
            .unwrap_or(crate::resource::DEFAULT_CONCURRENCY)
    }

    pub fn effective_follow_pages(&self) -> bool {
        self.follow_pages.unwrap_or(false)
    }

    /// Set API root and save
    pub fn set_api_uri(&mut self, uri: &str) -> Result<()> {
        let uri = validate_api_uri(uri)?;
        self.api_uri = Some(uri);
        self.save()
    }

    /// Set concurrency and save
    pub fn set_concurrency(&mut self, concurrency: usize) -> Result<()> {
        if concurrency == 0 {
            bail!("Concurrency must be at least 1");
        }
        self.concurrency = Some(concurrency);
        self.save()
    }

    /// Set pagination and save
    pub fn set_follow_pages(&mut self, follow: bool) -> Result<()> {
        self.follow_pages = Some(follow);
        self.save()
    }
}

/// Check that `uri` is an absolute http(s) URL and return it without a
/// trailing slash
pub fn validate_api_uri(uri: &str) -> Result<String> {
    let trimmed = uri.trim();
    let parsed = Url::parse(trimmed).with_context(|| format!("Invalid API URI '{}'", trimmed))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("Unsupported scheme '{}' in API URI (use http or https)", other),
    }
    if parsed.host_str().is_none() {
        bail!("API URI '{}' has no host", trimmed);
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
