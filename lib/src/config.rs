//! # Editor configuration
//!
//! Read from an optional JSON file. Missing fields take their defaults, so `{}`
//! is a complete configuration.
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_PATH: &str = "mtg-deck-editor-cache.gz";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Copies added or removed per edit
  pub card_amount: usize,
  /// Where fetched cards are kept between runs, `null` to disable
  pub cache_path: Option<PathBuf>,
  /// Offline card catalog, used instead of Gatherer when set
  pub catalog_path: Option<PathBuf>,
  /// Seed for reproducible hands
  pub seed: Option<u64>,
  pub gatherer: GathererConfig,
}

/// GathererConfig locates the Gatherer card pages. `%s` in a URL is replaced
/// by the card query as typed; the HTTP client escapes it when sending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GathererConfig {
  pub details_url: String,
  pub image_url: String,
  pub fetch_images: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      card_amount: 1,
      cache_path: Some(PathBuf::from(DEFAULT_CACHE_PATH)),
      catalog_path: None,
      seed: None,
      gatherer: GathererConfig::default(),
    }
  }
}

impl Default for GathererConfig {
  fn default() -> Self {
    Self {
      details_url: "http://gatherer.wizards.com/Pages/Card/Details.aspx?name=%s".to_string(),
      image_url: "http://gatherer.wizards.com/Handlers/Image.ashx?type=card&name=%s".to_string(),
      fetch_images: true,
    }
  }
}

#[derive(Debug)]
pub enum ConfigError {
  Io(std::io::Error),
  Json(serde_json::Error),
  /// A field holds a value the editor cannot work with
  Invalid(&'static str),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "config io error: {}", e),
      Self::Json(e) => write!(f, "config json error: {}", e),
      Self::Invalid(reason) => write!(f, "invalid config: {}", reason),
    }
  }
}

impl Error for ConfigError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Json(e) => Some(e),
      Self::Invalid(_) => None,
    }
  }
}

impl From<std::io::Error> for ConfigError {
  fn from(error: std::io::Error) -> Self {
    Self::Io(error)
  }
}

impl From<serde_json::Error> for ConfigError {
  fn from(error: serde_json::Error) -> Self {
    Self::Json(error)
  }
}

impl Config {
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(json)?;
    if config.card_amount == 0 {
      return Err(ConfigError::Invalid("card_amount must be at least 1"));
    }
    Ok(config)
  }

  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    info!("Loading config @ {}", path.display());
    Self::from_json(&fs::read_to_string(path)?)
  }
}

#[cfg(test)]
mod tests {
  use crate::config::*;

  #[test]
  fn empty_object_is_default() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.card_amount, 1);
    assert_eq!(config.cache_path, Some(PathBuf::from("mtg-deck-editor-cache.gz")));
    assert!(config.gatherer.fetch_images);
  }

  #[test]
  fn partial_config() {
    let config = Config::from_json(
      r#"{
        "card_amount": 4,
        "cache_path": null,
        "seed": 12,
        "gatherer": { "fetch_images": false }
      }"#,
    )
    .unwrap();
    assert_eq!(config.card_amount, 4);
    assert_eq!(config.cache_path, None);
    assert_eq!(config.seed, Some(12));
    assert!(!config.gatherer.fetch_images);
    assert!(config.gatherer.details_url.contains("Details.aspx"));
  }

  #[test]
  fn zero_amount_is_invalid() {
    match Config::from_json(r#"{"card_amount": 0}"#) {
      Err(ConfigError::Invalid(_)) => {}
      other => panic!("expected invalid config, got {:?}", other),
    }
  }

  #[test]
  fn malformed_json() {
    match Config::from_json("{card_amount: 2") {
      Err(ConfigError::Json(_)) => {}
      other => panic!("expected json error, got {:?}", other),
    }
  }

  #[test]
  fn missing_file() {
    let path = std::env::temp_dir().join("deck-editor-no-such-config.json");
    match Config::load(&path) {
      Err(ConfigError::Io(_)) => {}
      other => panic!("expected io error, got {:?}", other),
    }
  }
}
