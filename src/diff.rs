//! # Diff Module
//!
//! This module renders diffs between a file's original content and its
//! rewritten header. It is used in dry-run mode to show what a real run would
//! change.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Manages diff creation and rendering for header rewrites.
///
/// This struct handles:
/// - Generating diffs between original and rewritten content
/// - Displaying diffs to stderr with colorization
/// - Appending diffs to a file
#[derive(Debug, Clone, Default)]
pub struct DiffManager {
  /// Whether to show diffs on stderr
  pub show_diff: bool,

  /// File every diff is appended to
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether any diff output was requested.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Renders the line diff of `original` against `new`.
  ///
  /// Both sides are decoded lossily; the diff is for people, the rewrite
  /// itself stays byte exact.
  pub fn render(path: &Path, original: &[u8], new: &[u8]) -> String {
    let original = String::from_utf8_lossy(original);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(original.as_ref(), new.as_ref());

    let mut content = format!("Diff for {}:\n", path.display());
    for change in diff.iter_all_changes() {
      let sign = match change.tag() {
        ChangeTag::Delete => "-",
        ChangeTag::Insert => "+",
        ChangeTag::Equal => " ",
      };
      content.push_str(sign);
      content.push_str(change.value());
      if change.missing_newline() {
        content.push('\n');
      }
    }
    content.push('\n');
    content
  }

  /// Displays and/or saves the diff for one file.
  ///
  /// Diffs from several files are appended to the same save file, producing a
  /// single consolidated diff.
  pub fn display_diff(&self, path: &Path, original: &[u8], new: &[u8]) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }

    let content = Self::render(path, original, new);

    if self.show_diff {
      for line in content.lines() {
        if line.starts_with('+') {
          eprintln!("{}", line.if_supports_color(Stream::Stderr, |l| l.green()));
        } else if line.starts_with('-') {
          eprintln!("{}", line.if_supports_color(Stream::Stderr, |l| l.red()));
        } else {
          eprintln!("{}", line);
        }
      }
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(content.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_render_marks_changes() {
    let rendered = DiffManager::render(Path::new("a.h"), b"/*====\nKitware\n====*/\nint x;\n", b"/*====\nnew\n====*/\nint x;\n");
    assert!(rendered.starts_with("Diff for a.h:\n"));
    assert!(rendered.contains("-Kitware\n"));
    assert!(rendered.contains("+new\n"));
    assert!(rendered.contains(" int x;\n"));
  }

  #[test]
  fn test_saved_diffs_are_appended() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let diff_path = temp_dir.path().join("out.diff");
    let manager = DiffManager::new(false, Some(diff_path.clone()));

    manager.display_diff(Path::new("a.h"), b"a\n", b"b\n").expect("first");
    manager.display_diff(Path::new("b.h"), b"c\n", b"d\n").expect("second");

    let saved = std::fs::read_to_string(&diff_path).expect("read");
    assert!(saved.contains("Diff for a.h:"));
    assert!(saved.contains("Diff for b.h:"));
  }

  #[test]
  fn test_disabled_manager_writes_nothing() {
    let manager = DiffManager::default();
    assert!(!manager.is_enabled());
    assert!(manager.display_diff(Path::new("a.h"), b"a\n", b"b\n").is_ok());
  }
}
