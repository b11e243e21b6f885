#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use relicense::banner::Banner;
use relicense::config::{BannerConfig, Config, Holder, default_holders};
use relicense::processor::{LineEnding, Processor, ProcessorConfig};

/// Writes `content` to `rel` under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// A processor over the built-in defaults.
pub fn default_processor() -> Result<Processor> {
  Processor::new(ProcessorConfig::new(Config::default()))
}

pub fn kitware() -> Holder {
  default_holders()[0].clone()
}

pub fn sandia() -> Holder {
  default_holders()[1].clone()
}

/// The default banner for `holders`, LF terminated.
pub fn banner_for(holders: &[Holder]) -> String {
  Banner::from_config(&BannerConfig::default()).render(holders, LineEnding::Lf)
}
