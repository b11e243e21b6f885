//! # Banner Module
//!
//! This module renders the standardized license banner that replaces the
//! original license blocks, and checks that the banner is itself recognized by
//! the configured markers so that running relicense again is a no-op.
//!
//! ## Example
//!
//! ```rust
//! use relicense::banner::Banner;
//! use relicense::config::{BannerConfig, Holder};
//! use relicense::processor::LineEnding;
//!
//! let banner = Banner::from_config(&BannerConfig::default());
//! let holders = vec![Holder::new("kitware", "Kitware, Inc.", "Copyright-Kitware.txt")];
//! let text = banner.render(&holders, LineEnding::Lf);
//!
//! assert!(text.contains("see Copyright-Kitware.txt for details."));
//! ```

use std::io::Cursor;

use crate::config::{BannerConfig, ConfigError, HeaderRules, Holder};
use crate::holder_detection::HolderDetector;
use crate::processor::block_scanner::BlockScanner;
use crate::processor::file_io::{LineEnding, LineReader};
use crate::processor::holder_resolver::{Resolution, resolve};
use crate::processor::segmenter::{LineRole, Segmenter};
use crate::verbose_log;

/// The replacement banner: delimiter lines around one attribution line per
/// holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
  top: Vec<String>,
  attribution: String,
  bottom: Vec<String>,
}

impl Banner {
  pub fn from_config(config: &BannerConfig) -> Self {
    Self {
      top: config.top.clone(),
      attribution: config.attribution.clone(),
      bottom: config.bottom.clone(),
    }
  }

  /// Renders the attribution line for one holder.
  ///
  /// `{{name}}` and `{{notice}}` are replaced with the holder's fields.
  pub fn attribution_line(&self, holder: &Holder) -> String {
    self
      .attribution
      .replace("{{name}}", &holder.name)
      .replace("{{notice}}", &holder.notice)
  }

  /// Renders the full banner with every line terminated by `ending`.
  pub fn render(&self, holders: &[Holder], ending: LineEnding) -> String {
    let eol = ending.as_str();
    let mut out = String::new();

    for line in &self.top {
      out.push_str(line);
      out.push_str(eol);
    }
    for holder in holders {
      out.push_str(&self.attribution_line(holder));
      out.push_str(eol);
    }
    for line in &self.bottom {
      out.push_str(line);
      out.push_str(eol);
    }

    out
  }

  /// Checks that the banner survives a second run unchanged.
  ///
  /// For the full holder vocabulary and for every holder on its own, the
  /// rendered banner must segment as exactly one closed block covering every
  /// line, and must resolve back to the same holders in the same order.
  pub fn verify(&self, rules: &HeaderRules, detector: &dyn HolderDetector) -> Result<(), ConfigError> {
    if self.top.is_empty() || self.bottom.is_empty() {
      return Err(ConfigError::BannerNotIdempotent(
        "banner needs at least one top and one bottom line".to_string(),
      ));
    }

    let mut cases: Vec<Vec<Holder>> = vec![rules.holders.clone()];
    cases.extend(rules.holders.iter().map(|h| vec![h.clone()]));

    for holders in cases {
      if holders.is_empty() {
        continue;
      }
      let rendered = self.render(&holders, LineEnding::Lf);
      self.verify_segments(rules, &rendered)?;

      let scanner = BlockScanner::new(rules, detector);
      let scan = scanner
        .scan(LineReader::new(Cursor::new(rendered.as_bytes())))
        .map_err(|e| ConfigError::BannerNotIdempotent(e.to_string()))?;

      match resolve(&scan) {
        Resolution::Rewrite(found) if found == holders => {}
        Resolution::Rewrite(found) => {
          let names: Vec<_> = found.iter().map(|h| h.name.as_str()).collect();
          let expected: Vec<_> = holders.iter().map(|h| h.name.as_str()).collect();
          return Err(ConfigError::BannerNotIdempotent(format!(
            "banner for {:?} is read back as {:?}",
            expected, names
          )));
        }
        Resolution::Skip(reason) => {
          return Err(ConfigError::BannerNotIdempotent(format!("rendered banner is skipped: {}", reason)));
        }
      }
    }

    verbose_log!("Banner verified against {} marker pair(s)", rules.markers.len());
    Ok(())
  }

  fn verify_segments(&self, rules: &HeaderRules, rendered: &str) -> Result<(), ConfigError> {
    let mut segmenter = Segmenter::new(rules);
    let lines: Vec<&str> = rendered.lines().collect();
    let last = lines.len() - 1;

    for (i, line) in lines.iter().enumerate() {
      let role = segmenter.feed(line);
      let ok = match role {
        LineRole::BlockStart { .. } => i == 0,
        LineRole::BlockBody { .. } => i > 0 && i < last,
        LineRole::BlockEnd { .. } => i == last,
        LineRole::Content | LineRole::HeaderEnd { .. } => false,
      };
      if !ok {
        return Err(ConfigError::BannerNotIdempotent(format!(
          "banner line {} ({:?}) is read back as {:?}",
          i + 1,
          line,
          role
        )));
      }
    }

    Ok(())
  }
}
