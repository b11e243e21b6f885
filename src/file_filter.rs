//! # File Filter Module
//!
//! This module contains components for filtering candidate paths by file
//! suffix and by exclusion substrings.

use std::path::Path;

use crate::verbose_log;

/// Result of a file filtering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter paths based on certain criteria.
///
/// Paths handed to filters are relative to the walk root and use `/` as
/// separator.
pub trait FileFilter {
  /// Determines whether a path should be kept.
  fn should_process(&self, rel_path: &str) -> FilterResult;
}

/// Keeps files whose name ends with one of the configured suffixes.
///
/// Matching is case-insensitive, so `Foo.H` counts as a header.
pub struct ExtensionFilter {
  suffixes: Vec<String>,
}

impl ExtensionFilter {
  /// Creates a filter from bare extensions such as `"cxx"`.
  pub fn new(extensions: &[String]) -> Self {
    let suffixes = extensions.iter().map(|e| format!(".{}", e.to_lowercase())).collect();
    Self { suffixes }
  }
}

impl FileFilter for ExtensionFilter {
  fn should_process(&self, rel_path: &str) -> FilterResult {
    let lower = rel_path.to_lowercase();
    if self.suffixes.iter().any(|s| lower.ends_with(s.as_str())) {
      FilterResult::process()
    } else {
      FilterResult::skip("Extension not selected")
    }
  }
}

/// Drops paths containing any exclusion substring.
pub struct ExcludeFilter {
  patterns: Vec<String>,
}

impl ExcludeFilter {
  pub fn new(patterns: &[String]) -> Self {
    let patterns = patterns.iter().filter(|p| !p.is_empty()).cloned().collect();
    Self { patterns }
  }

  /// Returns the first pattern contained in `rel_path`.
  pub fn matching_pattern(&self, rel_path: &str) -> Option<&str> {
    self
      .patterns
      .iter()
      .find(|p| rel_path.contains(p.as_str()))
      .map(String::as_str)
  }
}

impl FileFilter for ExcludeFilter {
  fn should_process(&self, rel_path: &str) -> FilterResult {
    match self.matching_pattern(rel_path) {
      Some(pattern) => {
        verbose_log!("Skipping: {} (matches exclusion {:?})", rel_path, pattern);
        FilterResult::skip(format!("Matches exclusion {:?}", pattern))
      }
      None => FilterResult::process(),
    }
  }
}

/// Filter that combines multiple filters.
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  /// Creates a new CompositeFilter with the given filters.
  pub fn new(filters: Vec<Box<dyn FileFilter>>) -> Self {
    Self { filters }
  }

  /// Adds a filter to this CompositeFilter.
  pub fn add_filter(&mut self, filter: Box<dyn FileFilter>) {
    self.filters.push(filter);
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, rel_path: &str) -> FilterResult {
    for filter in &self.filters {
      let result = filter.should_process(rel_path);
      if !result.should_process {
        return result;
      }
    }
    FilterResult::process()
  }
}

/// Converts `path` to the root-relative, `/`-separated form filters expect.
pub fn relative_slash_path(path: &Path, root: &Path) -> String {
  let rel = path.strip_prefix(root).unwrap_or(path);
  let joined: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
  joined.join("/")
}
