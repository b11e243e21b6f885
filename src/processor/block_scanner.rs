//! # Block Scanner Module
//!
//! Streams a file through the [`Segmenter`] and records which known holders
//! are mentioned inside each recognized license block.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use tracing::trace;

use super::file_io::LineReader;
use super::segmenter::{LineRole, Segmenter};
use crate::config::{HeaderRules, Holder};
use crate::holder_detection::HolderDetector;

/// A holder found strictly inside a license block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Observation {
  /// Start token of the enclosing block's marker pair.
  pub start_marker: String,
  /// The holder that was mentioned.
  pub holder: Holder,
  /// Stop token of the enclosing block, `None` if the block never closed.
  pub stop_marker: Option<String>,
}

/// Why a file carries no usable license block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoLicenseReason {
  /// The file has zero bytes.
  EmptyFile,
  /// No start marker was found before the header ended.
  NoBlock,
  /// Blocks were found, but none mentions a known holder.
  NoHolder,
}

impl std::fmt::Display for NoLicenseReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      NoLicenseReason::EmptyFile => write!(f, "file is empty"),
      NoLicenseReason::NoBlock => write!(f, "no license block found"),
      NoLicenseReason::NoHolder => write!(f, "no known copyright holder in license block"),
    }
  }
}

/// Outcome of scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
  /// Deduplicated observations in first-occurrence order. Never empty.
  Found(IndexSet<Observation>),
  /// The "no license found" sentinel.
  NoLicense(NoLicenseReason),
}

/// Scans files for license blocks and the holders they mention.
pub struct BlockScanner<'a> {
  rules: &'a HeaderRules,
  detector: &'a dyn HolderDetector,
}

impl<'a> BlockScanner<'a> {
  pub const fn new(rules: &'a HeaderRules, detector: &'a dyn HolderDetector) -> Self {
    Self { rules, detector }
  }

  /// Scans the file at `path`.
  pub fn scan_file(&self, path: &Path) -> Result<ScanResult> {
    let reader = LineReader::open(path)?;
    self
      .scan(reader)
      .with_context(|| format!("Failed to read file: {}", path.display()))
  }

  /// Scans an already opened line stream.
  pub fn scan<R: BufRead>(&self, mut reader: LineReader<R>) -> std::io::Result<ScanResult> {
    let mut segmenter = Segmenter::new(self.rules);
    let mut observations = IndexSet::new();
    // Holders seen in the open block, finalized when it closes.
    let mut pending: Vec<&Holder> = Vec::new();
    let mut blocks = 0usize;
    let mut saw_bytes = false;
    let mut buf = Vec::new();

    while reader.next_line(&mut buf)? {
      saw_bytes = true;
      let line = String::from_utf8_lossy(&buf);

      match segmenter.feed(&line) {
        LineRole::BlockStart { pair } => {
          trace!("Block {} opened with {:?}", blocks, self.rules.markers[pair].start);
          blocks += 1;
          pending.clear();
        }
        LineRole::BlockBody { .. } => {
          for holder in self.detector.holders_in(&line) {
            if !pending.contains(&holder) {
              pending.push(holder);
            }
          }
        }
        LineRole::BlockEnd { pair } => {
          self.finalize(&mut observations, &mut pending, pair, true);
        }
        LineRole::HeaderEnd { interrupted } => {
          if let Some(pair) = interrupted {
            self.finalize(&mut observations, &mut pending, pair, false);
          }
          // Nothing after the header end can change the result.
          break;
        }
        LineRole::Content => {}
      }
    }

    if let Some(pair) = segmenter.open_pair() {
      self.finalize(&mut observations, &mut pending, pair, false);
    }

    let result = if !saw_bytes {
      ScanResult::NoLicense(NoLicenseReason::EmptyFile)
    } else if blocks == 0 {
      ScanResult::NoLicense(NoLicenseReason::NoBlock)
    } else if observations.is_empty() {
      ScanResult::NoLicense(NoLicenseReason::NoHolder)
    } else {
      ScanResult::Found(observations)
    };

    Ok(result)
  }

  fn finalize(&self, observations: &mut IndexSet<Observation>, pending: &mut Vec<&Holder>, pair: usize, closed: bool) {
    let marker = &self.rules.markers[pair];
    for holder in pending.drain(..) {
      observations.insert(Observation {
        start_marker: marker.start.clone(),
        holder: holder.clone(),
        stop_marker: closed.then(|| marker.stop.clone()),
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::holder_detection::SubstringHolderDetector;

  fn scan_str(content: &str) -> ScanResult {
    let rules = HeaderRules::default();
    let detector = SubstringHolderDetector::new(&rules.holders);
    let scanner = BlockScanner::new(&rules, &detector);
    scanner
      .scan(LineReader::new(Cursor::new(content.as_bytes().to_vec())))
      .expect("scan")
  }

  fn holder_tokens(result: &ScanResult) -> Vec<String> {
    match result {
      ScanResult::Found(obs) => obs.iter().map(|o| o.holder.token.clone()).collect(),
      ScanResult::NoLicense(_) => Vec::new(),
    }
  }

  #[test]
  fn test_empty_input_is_sentinel() {
    assert_eq!(scan_str(""), ScanResult::NoLicense(NoLicenseReason::EmptyFile));
  }

  #[test]
  fn test_no_block_is_sentinel() {
    assert_eq!(
      scan_str("// Copyright Kitware\nint x;\n"),
      ScanResult::NoLicense(NoLicenseReason::NoBlock)
    );
  }

  #[test]
  fn test_block_without_holder_is_sentinel() {
    assert_eq!(
      scan_str("/*====\n  All rights reserved.\n====*/\n"),
      ScanResult::NoLicense(NoLicenseReason::NoHolder)
    );
  }

  #[test]
  fn test_single_block_single_observation() {
    let result = scan_str("/*====\nCopyright Kitware\n====*/\n#include <a.h>\n");
    let ScanResult::Found(obs) = result else {
      panic!("expected observations");
    };
    assert_eq!(obs.len(), 1);
    let first = obs.first().expect("one observation");
    assert_eq!(first.start_marker, "/*====");
    assert_eq!(first.holder.token, "kitware");
    assert_eq!(first.stop_marker.as_deref(), Some("====*/"));
  }

  #[test]
  fn test_marker_lines_are_not_scanned_for_holders() {
    let result = scan_str("/*==== Kitware\n  nothing here\n====*/ Sandia\n");
    assert_eq!(result, ScanResult::NoLicense(NoLicenseReason::NoHolder));
  }

  #[test]
  fn test_repeated_holder_is_deduplicated() {
    let result = scan_str("/*====\nKitware\nkitware again\n====*/\n");
    assert_eq!(holder_tokens(&result), vec!["kitware"]);
  }

  #[test]
  fn test_multi_holder_in_first_occurrence_order() {
    let result = scan_str("/*====\nSandia Corporation\nKitware Inc\n====*/\n");
    assert_eq!(holder_tokens(&result), vec!["sandia", "kitware"]);

    let result = scan_str("/*====\nKitware Inc\nSandia Corporation\n====*/\n");
    assert_eq!(holder_tokens(&result), vec!["kitware", "sandia"]);
  }

  #[test]
  fn test_unterminated_block_has_no_stop_marker() {
    let result = scan_str("/*----\nCopyright Kitware\nint main() {}\n");
    let ScanResult::Found(obs) = result else {
      panic!("expected observations");
    };
    assert_eq!(obs.len(), 1);
    assert_eq!(obs[0].stop_marker, None);
  }

  #[test]
  fn test_header_end_interrupts_open_block() {
    let result = scan_str("/*====\nCopyright Sandia\n#include <a.h>\n====*/\n");
    let ScanResult::Found(obs) = result else {
      panic!("expected observations");
    };
    assert_eq!(obs[0].holder.token, "sandia");
    assert_eq!(obs[0].stop_marker, None);
  }

  #[test]
  fn test_blocks_after_header_end_are_ignored() {
    let result = scan_str("#include <a.h>\n/*====\nCopyright Kitware\n====*/\n");
    assert_eq!(result, ScanResult::NoLicense(NoLicenseReason::NoBlock));
  }

  #[test]
  fn test_observations_accumulate_across_blocks() {
    let result = scan_str("/*====\nKitware\n====*/\n/*----\nSandia\n----*/\n");
    let ScanResult::Found(obs) = result else {
      panic!("expected observations");
    };
    assert_eq!(obs.len(), 2);
    assert_eq!(obs[0].start_marker, "/*====");
    assert_eq!(obs[1].start_marker, "/*----");
    assert_eq!(obs[1].holder.token, "sandia");
  }

  #[test]
  fn test_same_holder_in_two_block_styles_gives_two_observations() {
    let result = scan_str("/*====\nKitware\n====*/\n/*----\nKitware\n----*/\n");
    assert_eq!(holder_tokens(&result), vec!["kitware", "kitware"]);
  }
}
