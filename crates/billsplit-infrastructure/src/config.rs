//! Application configuration.
//!
//! Optional TOML config at `~/.config/billsplit/config.toml`. Everything
//! has a working default; the file only exists to override the storage
//! location or point at a different extraction endpoint. The extraction
//! secret key itself stays in the environment.

use billsplit_core::error::{BillsplitError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Extraction service settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractionConfig {
    /// Endpoint of the receipt extraction service
    pub endpoint: String,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Override for the sessions collection file path
    pub storage_path: Option<PathBuf>,
    /// Extraction service settings, if configured
    pub extraction: Option<ExtractionConfig>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("billsplit").join("config.toml"))
}

/// Loads the configuration from the default config file path.
///
/// Returns the default configuration when the file (or the config
/// directory) does not exist or is empty.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let Some(path) = config_path() else {
        return Ok(AppConfig::default());
    };
    read_config(&path)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| BillsplitError::config(format!("Failed to read {path:?}: {e}")))?;

    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    Ok(toml::from_str(&content)?)
}
