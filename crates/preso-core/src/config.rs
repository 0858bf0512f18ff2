//! Configuration management for preso
//!
//! Settings live in `.preso/config.toml` under the working directory. Every
//! field has a default, so a missing file (or a partial one) is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{PresoError, Result};

/// Top-level preso configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresoConfig {
    /// Slide looper settings
    #[serde(default)]
    pub looper: LooperConfig,

    /// Content refresher settings
    #[serde(default)]
    pub refresher: RefresherConfig,
}

/// Slide looper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LooperConfig {
    /// Delay between slide advances in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Host serving the presenting view
    #[serde(default = "default_docs_host")]
    pub docs_host: String,

    /// Attach to an already running Chrome on this DevTools port instead of launching one
    #[serde(default)]
    pub debugging_port: Option<u16>,

    /// Launch Chrome headless (only useful for smoke tests)
    #[serde(default)]
    pub headless: bool,
}

/// Content refresher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefresherConfig {
    /// Object-id prefix marking managed elements and slides
    #[serde(default = "default_managed_prefix")]
    pub managed_prefix: String,

    /// Base URL of the presentations resource
    #[serde(default = "default_slides_api_base")]
    pub slides_api_base: String,

    /// Base URL of the spreadsheets resource
    #[serde(default = "default_sheets_api_base")]
    pub sheets_api_base: String,

    /// Environment variables checked, in order, for an OAuth access token
    #[serde(default = "default_token_env")]
    pub token_env: Vec<String>,

    /// Ask `gcloud auth print-access-token` when no env var is set
    #[serde(default = "default_gcloud_fallback")]
    pub gcloud_fallback: bool,
}

// Default value providers
fn default_interval_ms() -> u64 {
    60_000
}

fn default_docs_host() -> String {
    "docs.google.com".to_string()
}

fn default_managed_prefix() -> String {
    "__preso".to_string()
}

fn default_slides_api_base() -> String {
    "https://slides.googleapis.com/v1/presentations".to_string()
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_token_env() -> Vec<String> {
    vec![
        "GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
        "GOOGLE_ACCESS_TOKEN".to_string(),
    ]
}

fn default_gcloud_fallback() -> bool {
    true
}

impl PresoConfig {
    /// Load configuration from `.preso/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = root.join(".preso/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PresoError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Write default configuration to `.preso/config.toml`
    pub fn write_default(root: &Path) -> Result<()> {
        let config_dir = root.join(".preso");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| PresoError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

impl Default for PresoConfig {
    fn default() -> Self {
        Self {
            looper: LooperConfig::default(),
            refresher: RefresherConfig::default(),
        }
    }
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            docs_host: default_docs_host(),
            debugging_port: None,
            headless: false,
        }
    }
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            managed_prefix: default_managed_prefix(),
            slides_api_base: default_slides_api_base(),
            sheets_api_base: default_sheets_api_base(),
            token_env: default_token_env(),
            gcloud_fallback: default_gcloud_fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PresoConfig::default();
        assert_eq!(config.looper.interval_ms, 60_000);
        assert_eq!(config.looper.docs_host, "docs.google.com");
        assert_eq!(config.refresher.managed_prefix, "__preso");
        assert!(config.refresher.gcloud_fallback);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PresoConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.looper.interval_ms, 60_000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = PresoConfig::from_toml(
            r#"
            [looper]
            interval_ms = 15000

            [refresher]
            managed_prefix = "__deck"
            "#,
        )
        .unwrap();

        assert_eq!(config.looper.interval_ms, 15_000);
        assert_eq!(config.looper.docs_host, "docs.google.com");
        assert_eq!(config.refresher.managed_prefix, "__deck");
        assert_eq!(config.refresher.token_env.len(), 2);
    }

    #[test]
    fn test_write_default_round_trip() {
        let dir = TempDir::new().unwrap();
        PresoConfig::write_default(dir.path()).unwrap();
        assert!(dir.path().join(".preso/config.toml").exists());

        let config = PresoConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.refresher.slides_api_base, default_slides_api_base());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = PresoConfig::from_toml("looper = 3").unwrap_err();
        assert!(matches!(err, PresoError::Config(_)));
    }
}
