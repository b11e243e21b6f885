//! # File Collector Module
//!
//! This module walks the source tree and collects the candidate files: names
//! ending with a selected suffix, root-relative paths containing no exclusion
//! substring. Excluded directories are pruned before they are descended into.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::file_filter::{CompositeFilter, ExcludeFilter, ExtensionFilter, FileFilter, relative_slash_path};
use crate::verbose_log;

/// Files found by a walk, plus the problems met on the way.
#[derive(Debug, Default)]
pub struct Collection {
  /// Candidate files in walk order.
  pub files: Vec<PathBuf>,
  /// One message per directory or entry that could not be read.
  pub warnings: Vec<String>,
  /// Directories that were pruned by an exclusion.
  pub pruned: Vec<PathBuf>,
}

/// File collector for directory traversal.
pub struct FileCollector {
  files: CompositeFilter,
  excludes: ExcludeFilter,
}

impl FileCollector {
  /// Creates a collector selecting `extensions` and pruning `exclude`.
  pub fn new(extensions: &[String], exclude: &[String]) -> Self {
    let files = CompositeFilter::new(vec![
      Box::new(ExtensionFilter::new(extensions)),
      Box::new(ExcludeFilter::new(exclude)),
    ]);
    Self {
      files,
      excludes: ExcludeFilter::new(exclude),
    }
  }

  /// Applies the file filters to a root-relative path.
  fn is_candidate(&self, rel_path: &str) -> bool {
    let result = self.files.should_process(rel_path);
    if let Some(reason) = &result.reason {
      debug!("Skipped {}: {}", rel_path, reason);
    }
    result.should_process
  }

  /// Walks `root` depth first and returns the candidate files.
  ///
  /// At each level files come before subdirectories and both are sorted by
  /// name. A root that is a regular file is returned as is when its name
  /// passes the same suffix and exclusion filters. A missing root is an error, unreadable entries below it are only
  /// warnings.
  pub fn collect(&self, root: &Path) -> Result<Collection> {
    let metadata = match std::fs::metadata(root) {
      Ok(metadata) => metadata,
      Err(e) => bail!("Cannot access root {}: {}", root.display(), e),
    };

    let mut collection = Collection::default();

    if metadata.is_file() {
      let name = root.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
      if self.is_candidate(&name) {
        verbose_log!("Discovered: {}", root.display());
        collection.files.push(root.to_path_buf());
      }
      return Ok(collection);
    }

    debug!("Scanning directory: {}", root.display());
    let start_time = std::time::Instant::now();

    let mut pruned = Vec::new();
    let walker = WalkDir::new(root)
      .sort_by(files_first)
      .into_iter()
      .filter_entry(|entry| self.keep_entry(entry, root, &mut pruned));

    for entry in walker {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
          collection.warnings.push(format!("Cannot read {}: {}", path, e));
          continue;
        }
      };

      if !entry.file_type().is_file() {
        continue;
      }

      let rel = relative_slash_path(entry.path(), root);
      if self.is_candidate(&rel) {
        verbose_log!("Discovered: {}", entry.path().display());
        collection.files.push(entry.into_path());
      }
    }

    collection.pruned = pruned;
    debug!(
      "Found {} files in {}ms",
      collection.files.len(),
      start_time.elapsed().as_millis()
    );

    Ok(collection)
  }

  fn keep_entry(&self, entry: &DirEntry, root: &Path, pruned: &mut Vec<PathBuf>) -> bool {
    if entry.depth() == 0 {
      return true;
    }

    let rel = relative_slash_path(entry.path(), root);
    let Some(pattern) = self.excludes.matching_pattern(&rel) else {
      return true;
    };

    if entry.file_type().is_dir() {
      verbose_log!("Pruning: {} (matches exclusion {:?})", entry.path().display(), pattern);
      debug!("Pruned directory {} by exclusion {:?}", rel, pattern);
      pruned.push(entry.path().to_path_buf());
    }
    false
  }
}

/// Orders siblings so that files precede directories, each group by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
  let a_dir = a.file_type().is_dir();
  let b_dir = b.file_type().is_dir();
  a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
}
