//! # Block Rewriter Module
//!
//! Re-streams a file through the [`Segmenter`], drops every license block and
//! puts the rendered [`Banner`] where the first block started. Every other
//! byte is copied through unchanged.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use super::file_io::{LineEnding, LineReader, replace_atomically};
use super::segmenter::{LineRole, Segmenter};
use crate::banner::Banner;
use crate::config::{HeaderRules, Holder};

/// Failures specific to rewriting, as opposed to plain I/O.
#[derive(Debug, Error)]
pub enum RewriteError {
  #[error("no holders to attribute in {0}")]
  NoHolders(String),

  #[error("no license block found while rewriting {0}")]
  BlockVanished(String),
}

/// What a rewrite did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
  /// The header was replaced.
  Rewritten,
  /// The file already carries exactly the banner, nothing was written.
  Unchanged,
}

/// Bookkeeping of a single streaming pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewriteStats {
  /// Number of license blocks removed.
  pub blocks: usize,
  /// Whether the removed bytes are identical to the inserted banner.
  pub identical: bool,
}

impl RewriteStats {
  /// A single block equal to the banner means the output equals the input.
  pub const fn is_noop(&self) -> bool {
    self.blocks == 1 && self.identical
  }
}

/// Replaces license blocks with the standardized banner.
pub struct BlockRewriter<'a> {
  rules: &'a HeaderRules,
  banner: &'a Banner,
}

impl<'a> BlockRewriter<'a> {
  pub const fn new(rules: &'a HeaderRules, banner: &'a Banner) -> Self {
    Self { rules, banner }
  }

  /// Streams `reader` into `out` with the license blocks replaced.
  pub fn rewrite<R: BufRead, W: Write + ?Sized>(
    &self,
    mut reader: LineReader<R>,
    holders: &[Holder],
    out: &mut W,
  ) -> std::io::Result<RewriteStats> {
    let mut segmenter = Segmenter::new(self.rules);
    let mut ending: Option<LineEnding> = None;
    let mut banner: Option<Vec<u8>> = None;
    let mut removed: Vec<u8> = Vec::new();
    let mut blocks = 0usize;
    let mut buf = Vec::new();

    while reader.next_line(&mut buf)? {
      let eol = *ending.get_or_insert_with(|| LineEnding::detect(&buf));
      let role = segmenter.feed(&String::from_utf8_lossy(&buf));

      if !role.is_block() {
        out.write_all(&buf)?;
        continue;
      }

      if let LineRole::BlockStart { .. } = role {
        blocks += 1;
        if banner.is_none() {
          let rendered = self.banner.render(holders, eol).into_bytes();
          out.write_all(&rendered)?;
          banner = Some(rendered);
        }
      }

      // Only the first block can match the banner, later ones just count.
      if blocks == 1 {
        removed.extend_from_slice(&buf);
      }
    }

    let identical = banner.as_deref().is_some_and(|b| b == removed.as_slice());
    Ok(RewriteStats { blocks, identical })
  }

  /// Rewrites `path` in place through a temporary file.
  ///
  /// Nothing is written when the file already carries exactly the banner.
  pub fn rewrite_file(&self, path: &Path, holders: &[Holder]) -> Result<RewriteOutcome> {
    self.check_holders(path, holders)?;

    let reader = LineReader::open(path)?;
    let mut stats = RewriteStats::default();
    let replaced = replace_atomically(path, |out| {
      stats = self
        .rewrite(reader, holders, out)
        .with_context(|| format!("Failed to rewrite file: {}", path.display()))?;
      if stats.blocks == 0 {
        return Err(RewriteError::BlockVanished(path.display().to_string()).into());
      }
      Ok(!stats.is_noop())
    })?;

    debug!(
      "{}: removed {} block(s), replaced = {}",
      path.display(),
      stats.blocks,
      replaced
    );

    Ok(if replaced {
      RewriteOutcome::Rewritten
    } else {
      RewriteOutcome::Unchanged
    })
  }

  /// Computes the rewrite of `path` without touching it.
  ///
  /// Returns the original and the rewritten content for diffing.
  pub fn preview_file(&self, path: &Path, holders: &[Holder]) -> Result<(RewriteOutcome, Vec<u8>, Vec<u8>)> {
    self.check_holders(path, holders)?;

    let original = std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut rewritten = Vec::with_capacity(original.len());
    let stats = self.rewrite(LineReader::new(original.as_slice()), holders, &mut rewritten)?;
    if stats.blocks == 0 {
      return Err(RewriteError::BlockVanished(path.display().to_string()).into());
    }

    let outcome = if stats.is_noop() {
      RewriteOutcome::Unchanged
    } else {
      RewriteOutcome::Rewritten
    };
    Ok((outcome, original, rewritten))
  }

  fn check_holders(&self, path: &Path, holders: &[Holder]) -> Result<()> {
    if holders.is_empty() {
      return Err(RewriteError::NoHolders(path.display().to_string()).into());
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use tempfile::TempDir;

  use super::*;
  use crate::config::{BannerConfig, default_holders};

  fn rewrite_str(content: &str, holders: &[Holder]) -> (String, RewriteStats) {
    let rules = HeaderRules::default();
    let banner = Banner::from_config(&BannerConfig::default());
    let rewriter = BlockRewriter::new(&rules, &banner);
    let mut out = Vec::new();
    let stats = rewriter
      .rewrite(LineReader::new(Cursor::new(content.as_bytes().to_vec())), holders, &mut out)
      .expect("rewrite");
    (String::from_utf8(out).expect("utf8"), stats)
  }

  fn kitware() -> Vec<Holder> {
    default_holders()[..1].to_vec()
  }

  #[test]
  fn test_block_is_replaced_and_content_kept() {
    let (out, stats) = rewrite_str(
      "/*====\n  Copyright Kitware\n====*/\n#include <a.h>\nint x;\n",
      &kitware(),
    );
    let banner = Banner::from_config(&BannerConfig::default()).render(&kitware(), LineEnding::Lf);

    assert_eq!(out, format!("{}#include <a.h>\nint x;\n", banner));
    assert_eq!(stats.blocks, 1);
    assert!(!stats.is_noop());
  }

  #[test]
  fn test_banner_goes_where_first_block_started() {
    let (out, _) = rewrite_str("// a.h\n\n/*====\nKitware\n====*/\n", &kitware());
    assert!(out.starts_with("// a.h\n\n/*===="));
  }

  #[test]
  fn test_every_block_is_removed() {
    let (out, stats) = rewrite_str("/*====\nKitware\n====*/\n/*----\nSandia\n----*/\nint x;\n", &kitware());
    assert_eq!(stats.blocks, 2);
    assert!(!out.contains("Sandia"));
    assert!(!out.contains("/*----"));
    assert!(out.ends_with("=*/\nint x;\n"));
  }

  #[test]
  fn test_unterminated_block_swallows_rest_of_file() {
    let (out, stats) = rewrite_str("/*----\nCopyright Kitware\nint main() {}\n", &kitware());
    assert_eq!(stats.blocks, 1);
    assert!(!out.contains("int main"));
  }

  #[test]
  fn test_interrupted_block_keeps_guard_line() {
    let (out, _) = rewrite_str("/*====\nKitware\n#include <a.h>\n====*/\n", &kitware());
    assert!(out.ends_with("=*/\n#include <a.h>\n====*/\n"));
  }

  #[test]
  fn test_crlf_banner() {
    let (out, _) = rewrite_str("/*====\r\nKitware\r\n====*/\r\nint x;\r\n", &kitware());
    assert!(!out.replace("\r\n", "").contains('\n'));
    assert!(out.ends_with("int x;\r\n"));
  }

  #[test]
  fn test_banner_itself_is_a_noop() {
    let banner = Banner::from_config(&BannerConfig::default()).render(&kitware(), LineEnding::Lf);
    let input = format!("{}#include <a.h>\n", banner);
    let (out, stats) = rewrite_str(&input, &kitware());
    assert_eq!(out, input);
    assert!(stats.is_noop());
  }

  #[test]
  fn test_rewrite_file_then_unchanged() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("a.h");
    std::fs::write(&path, "/*====\n  Copyright Kitware\n====*/\n#include <a.h>\n").expect("write");

    let rules = HeaderRules::default();
    let banner = Banner::from_config(&BannerConfig::default());
    let rewriter = BlockRewriter::new(&rules, &banner);

    assert_eq!(
      rewriter.rewrite_file(&path, &kitware()).expect("first pass"),
      RewriteOutcome::Rewritten
    );
    let after_first = std::fs::read(&path).expect("read");

    assert_eq!(
      rewriter.rewrite_file(&path, &kitware()).expect("second pass"),
      RewriteOutcome::Unchanged
    );
    assert_eq!(std::fs::read(&path).expect("read"), after_first);
  }

  #[test]
  fn test_preview_does_not_touch_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("a.h");
    let original = "/*====\n  Copyright Kitware\n====*/\n";
    std::fs::write(&path, original).expect("write");

    let rules = HeaderRules::default();
    let banner = Banner::from_config(&BannerConfig::default());
    let rewriter = BlockRewriter::new(&rules, &banner);
    let (outcome, before, after) = rewriter.preview_file(&path, &kitware()).expect("preview");

    assert_eq!(outcome, RewriteOutcome::Rewritten);
    assert_eq!(before, original.as_bytes());
    assert_ne!(after, before);
    assert_eq!(std::fs::read_to_string(&path).expect("read"), original);
  }

  #[test]
  fn test_empty_holders_rejected() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("a.h");
    std::fs::write(&path, "/*====\nKitware\n====*/\n").expect("write");

    let rules = HeaderRules::default();
    let banner = Banner::from_config(&BannerConfig::default());
    let rewriter = BlockRewriter::new(&rules, &banner);
    assert!(rewriter.rewrite_file(&path, &[]).is_err());
  }
}
