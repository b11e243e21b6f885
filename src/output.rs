//! # Output Module
//!
//! This module centralizes all user-facing output for the relicense tool.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show the file count, progress and what was left alone
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `VERBOSE=1`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use std::io::Write;
use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Rewritten / already normalized
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Left untouched
  pub const SKIPPED: &str = "-";
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Width of the progress bar, in cells.
const PROGRESS_WIDTH: usize = 40;

/// Print the initial "N eligible files have been found" message.
pub fn print_start_message(file_count: usize) {
  if is_quiet() {
    return;
  }

  println!("{} eligible files have been found", file_count);
}

/// Renders one progress line, `[####....] k/N (p%)`.
pub fn render_progress(done: usize, total: usize, width: usize) -> String {
  let (filled, percent) = if total == 0 {
    (width, 100)
  } else {
    (done * width / total, done * 100 / total)
  };
  format!(
    "[{}{}] {}/{} ({}%)",
    "#".repeat(filled),
    ".".repeat(width - filled),
    done,
    total,
    percent
  )
}

/// Progress indicator drawn in place on stderr.
pub struct Progress {
  total: usize,
  done: usize,
  enabled: bool,
}

impl Progress {
  pub fn new(total: usize) -> Self {
    Self {
      total,
      done: 0,
      enabled: !is_quiet() && total > 0,
    }
  }

  /// Advances by one file and redraws.
  pub fn tick(&mut self) {
    self.done = (self.done + 1).min(self.total);
    if !self.enabled {
      return;
    }

    let line = render_progress(self.done, self.total, PROGRESS_WIDTH);
    let mut stderr = std::io::stderr().lock();
    // A broken stderr must not stop the batch.
    let _ = write!(stderr, "\r{}", line.if_supports_color(Stream::Stderr, |s| s.cyan()));
    let _ = stderr.flush();
  }

  /// Ends the progress line so later output starts on a fresh line.
  pub fn finish(&self) {
    if self.enabled {
      eprintln!();
    }
  }

  /// Clears the current line before a warning is printed.
  pub fn interrupt(&self) {
    if self.enabled && self.done > 0 {
      eprint!("\r{}\r", " ".repeat(PROGRESS_WIDTH + 32));
    }
  }
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

fn print_file_list(header: String, files: &[&FileReport], root: Option<&Path>, with_note: bool) {
  println!("{}", header);

  let count = files.len();
  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in files.iter().take(limit) {
    let display_path = make_relative_path(&file.path, root);
    match file.note.as_deref() {
      Some(note) if with_note => println!(
        "  {} {}",
        display_path,
        format!("({})", note).if_supports_color(Stream::Stdout, |s| s.dimmed())
      ),
      _ => println!("  {}", display_path),
    }
  }

  if !show_all && count > limit {
    println!("  ... and {} more (use VERBOSE=1 to see all)", count - limit);
  }
}

const fn files_word(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Print the list of files left without a recognized license.
///
/// Files are sorted alphabetically by path. In quiet mode only the bare paths
/// are printed, for scripting.
pub fn print_missing_license_files(files: &[&FileReport], root: Option<&Path>) {
  if files.is_empty() {
    return;
  }

  let mut sorted_files: Vec<_> = files.to_vec();
  sorted_files.sort_by(|a, b| a.path.cmp(&b.path));

  if is_quiet() {
    for file in &sorted_files {
      println!("{}", make_relative_path(&file.path, root));
    }
    return;
  }

  let count = sorted_files.len();
  let header = format!(
    "{} {} {} without a recognized license:",
    symbols::SKIPPED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    count,
    files_word(count)
  );
  print_file_list(header, &sorted_files, root, true);
}

/// Print the list of files whose header was rewritten.
pub fn print_rewritten_files(files: &[&FileReport], root: Option<&Path>, dry_run: bool) {
  if is_quiet() || files.is_empty() {
    return;
  }

  let count = files.len();
  let verb = if dry_run { "Would rewrite" } else { "Rewrote" };
  let header = format!(
    "{} {} header of {} {}:",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    verb,
    count,
    files_word(count)
  );
  print_file_list(header, files, root, false);
}

/// Print the list of files that could not be processed.
///
/// Failures are errors, so they are shown even in quiet mode.
pub fn print_failed_files(files: &[&FileReport], root: Option<&Path>) {
  if files.is_empty() {
    return;
  }

  let count = files.len();
  eprintln!(
    "{} {} {} failed:",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    count,
    files_word(count)
  );
  for file in files {
    eprintln!(
      "  {}: {}",
      make_relative_path(&file.path, root),
      file.note.as_deref().unwrap_or("unknown error")
    );
  }
}

/// Print the processing summary.
///
/// Format: "Summary: X rewritten, Y unchanged, Z without license, W failed"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let rewritten = summary.rewritten.if_supports_color(Stream::Stdout, |s| s.cyan());
  let unchanged = summary.unchanged.if_supports_color(Stream::Stdout, |s| s.cyan());
  let missing = summary.without_license();
  let missing_str = if missing > 0 {
    missing.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string()
  } else {
    missing.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };
  let failed_str = if summary.failed > 0 {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };

  let mut summary_line = format!(
    "Summary: {} rewritten, {} unchanged, {} without license, {} failed",
    rewritten, unchanged, missing_str, failed_str
  );

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time_secs));
  }

  println!("{}", summary_line);
}

/// Categorize file reports into different groups for output.
#[derive(Default)]
pub struct CategorizedReports<'a> {
  pub rewritten: Vec<&'a FileReport>,
  pub unchanged: Vec<&'a FileReport>,
  /// Empty files and files without a recognized license
  pub missing: Vec<&'a FileReport>,
  pub failed: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  /// Categorize a slice of file reports.
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut categorized = Self::default();

    for report in reports {
      match report.action {
        FileAction::Rewritten => categorized.rewritten.push(report),
        FileAction::Unchanged => categorized.unchanged.push(report),
        FileAction::NoLicense | FileAction::Empty => categorized.missing.push(report),
        FileAction::Failed => categorized.failed.push(report),
      }
    }

    categorized
  }
}

/// Make a path relative to the walk root for display.
fn make_relative_path(path: &Path, root: Option<&Path>) -> String {
  if let Some(root) = root {
    path
      .strip_prefix(root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|_| path.to_string_lossy().to_string())
  } else {
    path.to_string_lossy().to_string()
  }
}
