//! # File I/O Module
//!
//! This module provides the streaming and atomic-replace file operations used
//! by the scanner and the rewriter. Files are read line by line as raw bytes
//! so that every byte outside a license block survives the rewrite unchanged,
//! whatever the file's encoding.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Streams a reader one raw line (terminator included) at a time.
pub struct LineReader<R> {
  inner: R,
}

impl LineReader<BufReader<File>> {
  /// Opens `path` for line streaming.
  pub fn open(path: &Path) -> Result<Self> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    Ok(Self::new(BufReader::new(file)))
  }
}

impl<R: BufRead> LineReader<R> {
  pub const fn new(inner: R) -> Self {
    Self { inner }
  }

  /// Reads the next line into `buf`, replacing its contents.
  ///
  /// Returns `false` at end of input.
  pub fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    Ok(self.inner.read_until(b'\n', buf)? > 0)
  }
}

/// Line terminator style of a file, taken from its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
  #[default]
  Lf,
  CrLf,
}

impl LineEnding {
  pub fn detect(first_line: &[u8]) -> Self {
    if first_line.ends_with(b"\r\n") {
      LineEnding::CrLf
    } else {
      LineEnding::Lf
    }
  }

  pub const fn as_str(self) -> &'static str {
    match self {
      LineEnding::Lf => "\n",
      LineEnding::CrLf => "\r\n",
    }
  }
}

/// Writes a replacement for `path` through a temporary file in the same
/// directory and renames it over the original once `fill` succeeded.
///
/// `fill` returns whether the new content should be committed; returning
/// `false` discards the temporary file and leaves the original alone. The
/// original's permissions are carried over. If `fill` or any later step fails,
/// the temporary file is removed and the original is left untouched.
///
/// Returns whether the original was replaced.
pub fn replace_atomically<F>(path: &Path, fill: F) -> Result<bool>
where
  F: FnOnce(&mut dyn Write) -> Result<bool>,
{
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let mut temp = NamedTempFile::new_in(dir)
    .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

  let commit = {
    let mut writer = io::BufWriter::new(temp.as_file_mut());
    let commit = fill(&mut writer)?;
    writer
      .flush()
      .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    commit
  };

  if !commit {
    return Ok(false);
  }

  let permissions = std::fs::metadata(path)
    .with_context(|| format!("Failed to read metadata: {}", path.display()))?
    .permissions();
  temp
    .as_file()
    .set_permissions(permissions)
    .with_context(|| format!("Failed to copy permissions onto temporary file for {}", path.display()))?;
  temp
    .as_file()
    .sync_all()
    .with_context(|| format!("Failed to sync temporary file for {}", path.display()))?;

  temp
    .persist(path)
    .map_err(|e| e.error)
    .with_context(|| format!("Failed to replace file: {}", path.display()))?;

  Ok(true)
}
