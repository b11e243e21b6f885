//! # Configuration Module
//!
//! This module provides configuration support for relicense: which files are
//! candidates, which marker pairs delimit a license block, which holders are
//! recognized and what the replacement banner looks like.
//!
//! Configuration can be specified in a `.relicense.toml` file at the root of
//! the processed tree, via the `RELICENSE_CONFIG` environment variable, or
//! with `--config`. Every key that is omitted falls back to the built-in
//! defaults, which target VTK/ParaView style trees.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".relicense.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "RELICENSE_CONFIG";

/// File suffixes (without the leading dot) processed by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["h", "hxx", "txx", "cxx", "cpp", "c"];

/// Root-relative path fragments pruned by default.
pub const DEFAULT_EXCLUDES: &[&str] = &["ThirdParty", "Utilities/KWSys", "Utilities/MetaIO"];

/// Preprocessor directives that end the header region by default.
pub const DEFAULT_HEADER_END: &[&str] = &["#include", "#if", "#define", "#pragma"];

const DEFAULT_BANNER_TOP: &str = "/*=========================================================================";
const DEFAULT_BANNER_BOTTOM: &str = "=========================================================================*/";
const DEFAULT_ATTRIBUTION: &str = "  Copyright (c) {{name}}, see {{notice}} for details.";

/// A `(start, stop)` pair of literal substrings delimiting one license block
/// style.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MarkerPair {
  /// Substring that opens a block.
  pub start: String,
  /// Substring that closes a block opened by `start`.
  pub stop: String,
}

impl MarkerPair {
  pub fn new(start: &str, stop: &str) -> Self {
    Self {
      start: start.to_string(),
      stop: stop.to_string(),
    }
  }
}

/// A known copyright holder.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
pub struct Holder {
  /// Case-insensitive substring that attributes a block to this holder.
  pub token: String,
  /// Name written into the banner.
  pub name: String,
  /// Canonical copyright-notice file the banner points at.
  pub notice: String,
}

impl Holder {
  pub fn new(token: &str, name: &str, notice: &str) -> Self {
    Self {
      token: token.to_string(),
      name: name.to_string(),
      notice: notice.to_string(),
    }
  }
}

/// Layout of the replacement banner.
///
/// `attribution` is rendered once per holder; `{{name}}` and `{{notice}}` are
/// substituted with the holder's fields.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BannerConfig {
  pub top: Vec<String>,
  pub attribution: String,
  pub bottom: Vec<String>,
}

impl Default for BannerConfig {
  fn default() -> Self {
    Self {
      top: vec![DEFAULT_BANNER_TOP.to_string()],
      attribution: DEFAULT_ATTRIBUTION.to_string(),
      bottom: vec![DEFAULT_BANNER_BOTTOM.to_string()],
    }
  }
}

/// Main configuration struct for relicense.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// File suffixes to process, without the leading dot.
  pub extensions: Vec<String>,

  /// Root-relative path fragments whose directories are never descended into.
  pub exclude: Vec<String>,

  /// Substrings marking the end of the header region.
  pub header_end: Vec<String>,

  /// Marker pairs, tried in declared order. `None` selects the defaults.
  pub markers: Option<Vec<MarkerPair>>,

  /// Legacy form: start tokens matched positionally with `stop_markers`.
  pub start_markers: Option<Vec<String>>,

  /// Legacy form: stop tokens matched positionally with `start_markers`.
  pub stop_markers: Option<Vec<String>>,

  /// Known holders, in vocabulary order.
  pub holders: Vec<Holder>,

  /// Replacement banner layout.
  pub banner: BannerConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
      exclude: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
      header_end: DEFAULT_HEADER_END.iter().map(|s| (*s).to_string()).collect(),
      markers: None,
      start_markers: None,
      stop_markers: None,
      holders: default_holders(),
      banner: BannerConfig::default(),
    }
  }
}

/// Marker pairs used when the configuration names none.
pub fn default_markers() -> Vec<MarkerPair> {
  vec![MarkerPair::new("/*====", "====*/"), MarkerPair::new("/*----", "----*/")]
}

/// Holder vocabulary used when the configuration names none.
pub fn default_holders() -> Vec<Holder> {
  vec![
    Holder::new("kitware", "Kitware, Inc.", "Copyright-Kitware.txt"),
    Holder::new(
      "sandia",
      "National Technology & Engineering Solutions of Sandia, LLC (NTESS)",
      "Copyright-NTESS.txt",
    ),
  ]
}

/// Validated marker and holder rules shared by the scanner and the rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRules {
  /// Marker pairs in match order.
  pub markers: Vec<MarkerPair>,
  /// Substrings that end the header region.
  pub header_end: Vec<String>,
  /// Holder vocabulary; tokens are lower-cased.
  pub holders: Vec<Holder>,
}

impl Default for HeaderRules {
  fn default() -> Self {
    Self {
      markers: default_markers(),
      header_end: DEFAULT_HEADER_END.iter().map(|s| (*s).to_string()).collect(),
      holders: default_holders(),
    }
  }
}

/// Error type for configuration operations.
///
/// Every variant is a setup error: it is reported before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// The legacy start/stop lists do not pair up.
  #[error("Marker lists do not pair up: {starts} start marker(s) but {stops} stop marker(s)")]
  MismatchedMarkers { starts: usize, stops: usize },

  /// A marker pair has an empty token, which would match every line.
  #[error("Marker pair {index} has an empty {which} token")]
  EmptyMarker { index: usize, which: &'static str },

  /// A holder entry is unusable.
  #[error("Invalid holder '{holder}': {message}")]
  InvalidHolder { holder: String, message: String },

  /// An extension entry is malformed.
  #[error("Invalid extension '{extension}': {message}")]
  InvalidExtension { extension: String, message: String },

  /// The banner would not be recognized as a license block on the next run.
  #[error("Banner is not idempotent: {0}")]
  BannerNotIdempotent(String),
}

impl Config {
  /// Load configuration from a file.
  ///
  /// The returned configuration has already been validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    verbose_log!(
      "Loaded {} marker pair(s) and {} holder(s)",
      config.marker_pairs()?.len(),
      config.holders.len()
    );

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - Legacy marker lists have equal length and no marker token is empty
  /// - Holder tokens, names and notices are non-empty
  /// - Extensions don't include the leading dot
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.marker_pairs()?;

    for holder in &self.holders {
      if holder.token.trim().is_empty() {
        return Err(ConfigError::InvalidHolder {
          holder: holder.name.clone(),
          message: "token cannot be empty".to_string(),
        });
      }
      if holder.name.trim().is_empty() || holder.notice.trim().is_empty() {
        return Err(ConfigError::InvalidHolder {
          holder: holder.token.clone(),
          message: "name and notice cannot be empty".to_string(),
        });
      }
    }

    for ext in &self.extensions {
      if ext.starts_with('.') {
        return Err(ConfigError::InvalidExtension {
          extension: ext.clone(),
          message: "extension should not include leading dot".to_string(),
        });
      }
      if ext.is_empty() {
        return Err(ConfigError::InvalidExtension {
          extension: ext.clone(),
          message: "extension cannot be empty".to_string(),
        });
      }
    }

    Ok(())
  }

  /// Resolves the ordered marker pairs.
  ///
  /// Explicit `markers` come first, followed by the legacy parallel lists
  /// zipped positionally. Lists of different lengths are rejected.
  pub fn marker_pairs(&self) -> Result<Vec<MarkerPair>, ConfigError> {
    let legacy = match (&self.start_markers, &self.stop_markers) {
      (None, None) => None,
      (starts, stops) => {
        let starts = starts.as_deref().unwrap_or_default();
        let stops = stops.as_deref().unwrap_or_default();
        if starts.len() != stops.len() {
          return Err(ConfigError::MismatchedMarkers {
            starts: starts.len(),
            stops: stops.len(),
          });
        }
        Some(
          starts
            .iter()
            .zip(stops)
            .map(|(start, stop)| MarkerPair::new(start, stop))
            .collect::<Vec<_>>(),
        )
      }
    };

    let pairs = match (&self.markers, legacy) {
      (Some(explicit), Some(legacy)) => explicit.iter().cloned().chain(legacy).collect(),
      (Some(explicit), None) => explicit.clone(),
      (None, Some(legacy)) => legacy,
      (None, None) => default_markers(),
    };

    for (index, pair) in pairs.iter().enumerate() {
      if pair.start.is_empty() {
        return Err(ConfigError::EmptyMarker { index, which: "start" });
      }
      if pair.stop.is_empty() {
        return Err(ConfigError::EmptyMarker { index, which: "stop" });
      }
    }

    Ok(pairs)
  }

  /// Builds the validated rules the scanner and rewriter run on.
  pub fn header_rules(&self) -> Result<HeaderRules, ConfigError> {
    self.validate()?;

    let holders = self
      .holders
      .iter()
      .map(|h| Holder {
        token: h.token.to_lowercase(),
        name: h.name.clone(),
        notice: h.notice.clone(),
      })
      .collect();

    Ok(HeaderRules {
      markers: self.marker_pairs()?,
      header_end: self.header_end.iter().filter(|s| !s.is_empty()).cloned().collect(),
      holders,
    })
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `RELICENSE_CONFIG` environment variable
/// 3. `.relicense.toml` in the processed root directory
pub fn discover_config_path(explicit_path: Option<&Path>, root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    verbose_log!("Using explicit config path: {}", path.display());
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let root_config = root.join(DEFAULT_CONFIG_FILENAME);
  if root_config.is_file() {
    verbose_log!("Using config: {}", root_config.display());
    return Some(root_config);
  }

  verbose_log!("No config file found, using built-in defaults");
  None
}

/// Load configuration from the discovered path, or return the defaults.
///
/// An explicit path that does not exist is an error rather than a silent
/// fallback.
pub fn load_config(explicit_path: Option<&Path>, root: &Path, no_config: bool) -> Result<Config, ConfigError> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(Config::default());
  }

  match discover_config_path(explicit_path, root) {
    Some(path) => Config::load(&path),
    None => Ok(Config::default()),
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.marker_pairs().expect("pairs"), default_markers());
  }

  #[test]
  fn test_parse_explicit_markers() {
    let config: Config = toml::from_str(concat!(
      "[[markers]]\n",
      "start = \"/*****\"\n",
      "stop = \"*****/\"\n",
    ))
    .expect("config should parse");

    let pairs = config.marker_pairs().expect("pairs");
    assert_eq!(pairs, vec![MarkerPair::new("/*****", "*****/")]);
    // Unspecified keys keep their defaults
    assert_eq!(config.holders, default_holders());
  }

  #[test]
  fn test_legacy_marker_lists_are_zipped() {
    let config: Config = toml::from_str(concat!(
      "start-markers = [\"/*====\", \"//----\"]\n",
      "stop-markers = [\"====*/\", \"//----\"]\n",
    ))
    .expect("config should parse");

    let pairs = config.marker_pairs().expect("pairs");
    assert_eq!(
      pairs,
      vec![MarkerPair::new("/*====", "====*/"), MarkerPair::new("//----", "//----")]
    );
  }

  #[test]
  fn test_mismatched_legacy_marker_lists() {
    let config: Config = toml::from_str(concat!(
      "start-markers = [\"/*====\", \"/*----\"]\n",
      "stop-markers = [\"====*/\"]\n",
    ))
    .expect("config should parse");

    let err = config.validate().expect_err("should fail");
    assert!(matches!(err, ConfigError::MismatchedMarkers { starts: 2, stops: 1 }));
  }

  #[test]
  fn test_only_start_markers_is_mismatched() {
    let config: Config = toml::from_str("start-markers = [\"/*====\"]\n").expect("config should parse");
    assert!(matches!(
      config.validate(),
      Err(ConfigError::MismatchedMarkers { starts: 1, stops: 0 })
    ));
  }

  #[test]
  fn test_empty_marker_token_is_rejected() {
    let config = Config {
      markers: Some(vec![MarkerPair::new("/*", "")]),
      ..Config::default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigError::EmptyMarker { index: 0, which: "stop" })
    ));
  }

  #[test]
  fn test_empty_holder_token_is_rejected() {
    let config = Config {
      holders: vec![Holder::new(" ", "Someone", "Copyright.txt")],
      ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidHolder { .. })));
  }

  #[test]
  fn test_extension_leading_dot_is_rejected() {
    let config = Config {
      extensions: vec![".h".to_string()],
      ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidExtension { .. })));
  }

  #[test]
  fn test_header_rules_lowercase_tokens() {
    let config = Config {
      holders: vec![Holder::new("KitWare", "Kitware, Inc.", "Copyright.txt")],
      ..Config::default()
    };
    let rules = config.header_rules().expect("rules");
    assert_eq!(rules.holders[0].token, "kitware");
    assert_eq!(rules.holders[0].name, "Kitware, Inc.");
  }

  #[test]
  fn test_unknown_key_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&config_path, "colour = \"blue\"\n").expect("write config");

    assert!(matches!(
      Config::load(&config_path),
      Err(ConfigError::ParseError { .. })
    ));
  }

  #[test]
  fn test_load_config_file_not_found() {
    let result = Config::load(Path::new("/nonexistent/path/.relicense.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
  }

  #[test]
  fn test_discover_config_root() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&config_path, "").expect("write config");

    let result = discover_config_path(None, temp_dir.path());
    assert_eq!(result, Some(config_path));
  }

  #[test]
  fn test_load_config_no_config_uses_defaults() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILENAME), "not = [valid").expect("write config");

    let config = load_config(None, temp_dir.path(), true).expect("defaults");
    assert_eq!(config, Config::default());
  }
}
