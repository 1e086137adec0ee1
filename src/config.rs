use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::gesture::GestureConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub cache: CacheConfig,
  pub gestures: GestureConfig,
  pub terminal: TerminalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL that endpoint paths are joined onto
  pub base_url: String,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8000/api".to_string(),
      timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// TTL for cached GETs. Negative values are treated as 0 (no caching).
  pub default_ttl_secs: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      default_ttl_secs: 300,
    }
  }
}

impl CacheConfig {
  pub fn default_ttl(&self) -> Duration {
    if self.default_ttl_secs < 0 {
      warn!(ttl = self.default_ttl_secs, "negative cache ttl, using 0");
      return Duration::ZERO;
    }
    Duration::from_secs(self.default_ttl_secs as u64)
  }
}

/// Mapping from terminal cells to the pixel units gestures are measured in.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
  pub cell_width_px: f64,
  pub cell_height_px: f64,
  /// Scroll offset change per mouse wheel notch
  pub scroll_step_px: f64,
}

impl Default for TerminalConfig {
  fn default() -> Self {
    Self {
      cell_width_px: 8.0,
      cell_height_px: 16.0,
      scroll_step_px: 40.0,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./ielts-client.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/ielts-client/config.yaml
  ///
  /// Every field has a default, so finding no file is not an error.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("ielts-client.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("ielts-client").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file deserializes to null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Get the API bearer token from the environment, if set.
  ///
  /// Checks IELTS_API_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("IELTS_API_TOKEN")
      .ok()
      .filter(|t| !t.is_empty())
  }
}
