//! # Report Module
//!
//! This module provides functionality for generating reports of a relicense
//! run in JSON or CSV.
//!
//! It captures what happened to each candidate file (rewritten, already
//! normalized, skipped or failed) together with the holders that were
//! attributed, and can output this information in the requested format.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Information about a processed file for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
  /// Path to the file
  #[serde(with = "path_serialization")]
  pub path: PathBuf,
  /// What happened to the file
  pub action: FileAction,
  /// Display names of the holders attributed in the banner
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub holders: Vec<String>,
  /// Why the file was skipped or failed
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

impl FileReport {
  pub fn new(path: PathBuf, action: FileAction) -> Self {
    Self {
      path,
      action,
      holders: Vec::new(),
      note: None,
    }
  }

  pub fn with_holders(mut self, holders: Vec<String>) -> Self {
    self.holders = holders;
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }
}

/// Possible outcomes for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
  /// License blocks were replaced by the banner
  Rewritten,
  /// The file already carried exactly the banner
  Unchanged,
  /// No recognized license block with a known holder
  #[serde(rename = "no_license")]
  NoLicense,
  /// The file has zero bytes
  Empty,
  /// Reading or replacing the file failed
  Failed,
}

impl FileAction {
  pub const fn as_str(self) -> &'static str {
    match self {
      FileAction::Rewritten => "rewritten",
      FileAction::Unchanged => "unchanged",
      FileAction::NoLicense => "no_license",
      FileAction::Empty => "empty",
      FileAction::Failed => "failed",
    }
  }
}

/// Helper module for serializing/deserializing PathBuf
mod path_serialization {
  use std::path::PathBuf;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(path: &std::path::Path, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&path.to_string_lossy())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Ok(PathBuf::from(s))
  }
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// JSON format for machine readability
  Json,
  /// CSV format for spreadsheet compatibility
  Csv,
}

impl std::fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReportFormat::Json => write!(f, "JSON"),
      ReportFormat::Csv => write!(f, "CSV"),
    }
  }
}

/// Report Generator for creating run reports
pub struct ReportGenerator<'a> {
  /// Format of the report to generate
  format: ReportFormat,
  /// Path where the report will be saved
  output_path: &'a std::path::Path,
}

impl<'a> ReportGenerator<'a> {
  /// Create a new report generator
  pub const fn new(format: ReportFormat, output_path: &'a std::path::Path) -> Self {
    Self { format, output_path }
  }

  /// Generate a report from a collection of file reports
  ///
  /// # Returns
  ///
  /// `Ok(())` if the report was generated successfully, or an error if the
  /// report couldn't be generated or written to disk.
  pub fn generate(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<()> {
    let content = match self.format {
      ReportFormat::Json => generate_json(files, summary)?,
      ReportFormat::Csv => generate_csv(files, summary),
    };

    fs::write(self.output_path, content)
      .with_context(|| format!("Failed to write {} report to {}", self.format, self.output_path.display()))
  }
}

/// Generate JSON report content
fn generate_json(files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
  let report = serde_json::json!({
    "summary": summary,
    "files": files,
  });

  Ok(serde_json::to_string_pretty(&report)?)
}

/// Generate CSV report content
fn generate_csv(files: &[FileReport], summary: &ProcessingSummary) -> String {
  let mut csv = String::new();

  csv.push_str("file_path,action,holders,notes\n");

  for file in files {
    let path = escape_csv(&file.path.to_string_lossy());
    let holders = escape_csv(&file.holders.join("; "));
    let note = file.note.as_deref().map(escape_csv).unwrap_or_default();
    csv.push_str(&format!("{},{},{},{}\n", path, file.action.as_str(), holders, note));
  }

  csv.push_str("\n# Summary\n");
  csv.push_str(&format!("Total files,{}\n", summary.total_files));
  csv.push_str(&format!("Rewritten,{}\n", summary.rewritten));
  csv.push_str(&format!("Unchanged,{}\n", summary.unchanged));
  csv.push_str(&format!("Without license,{}\n", summary.no_license));
  csv.push_str(&format!("Empty,{}\n", summary.empty));
  csv.push_str(&format!("Failed,{}\n", summary.failed));
  csv.push_str(&format!("Processing time (seconds),{:.2}\n", summary.processing_time_secs));
  csv.push_str(&format!("Generated on,{}\n", summary.generated_at));

  csv
}

/// Quotes a CSV field when it contains a separator, quote or newline.
fn escape_csv(field: &str) -> String {
  if field.contains([',', '"', '\n']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
  /// Number of candidate files
  pub total_files: usize,
  pub rewritten: usize,
  pub unchanged: usize,
  pub no_license: usize,
  pub empty: usize,
  pub failed: usize,
  /// Processing time in seconds
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
  /// Local time the summary was produced
  pub generated_at: String,
}

impl ProcessingSummary {
  /// Create a ProcessingSummary from a collection of FileReports
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time_secs: processing_time.as_secs_f64(),
      generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
      ..Default::default()
    };

    for file in files {
      match file.action {
        FileAction::Rewritten => summary.rewritten += 1,
        FileAction::Unchanged => summary.unchanged += 1,
        FileAction::NoLicense => summary.no_license += 1,
        FileAction::Empty => summary.empty += 1,
        FileAction::Failed => summary.failed += 1,
      }
    }

    summary
  }

  /// Files left without a usable license, empty ones included.
  pub const fn without_license(&self) -> usize {
    self.no_license + self.empty
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  fn sample_reports() -> Vec<FileReport> {
    vec![
      FileReport::new(PathBuf::from("Common/a.h"), FileAction::Rewritten).with_holders(vec!["Kitware, Inc.".to_string()]),
      FileReport::new(PathBuf::from("Common/b.h"), FileAction::Unchanged),
      FileReport::new(PathBuf::from("Common/c.h"), FileAction::NoLicense).with_note("no license block found"),
      FileReport::new(PathBuf::from("Common/d.h"), FileAction::Empty),
      FileReport::new(PathBuf::from("Common/e.h"), FileAction::Failed).with_note("Permission denied"),
    ]
  }

  #[test]
  fn test_summary_counts() {
    let summary = ProcessingSummary::from_reports(&sample_reports(), Duration::from_millis(1500));
    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.rewritten, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.no_license, 1);
    assert_eq!(summary.empty, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.without_license(), 2);
  }

  #[test]
  fn test_json_report() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("report.json");
    let reports = sample_reports();
    let summary = ProcessingSummary::from_reports(&reports, Duration::from_secs(1));

    ReportGenerator::new(ReportFormat::Json, &path)
      .generate(&reports, &summary)
      .expect("generate");

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(value["summary"]["rewritten"], 1);
    assert_eq!(value["files"][0]["action"], "rewritten");
    assert_eq!(value["files"][0]["holders"][0], "Kitware, Inc.");
    assert_eq!(value["files"][2]["action"], "no_license");
    assert!(value["files"][1].get("note").is_none());
  }

  #[test]
  fn test_csv_report_quotes_fields() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("report.csv");
    let reports = sample_reports();
    let summary = ProcessingSummary::from_reports(&reports, Duration::from_secs(1));

    ReportGenerator::new(ReportFormat::Csv, &path)
      .generate(&reports, &summary)
      .expect("generate");

    let csv = fs::read_to_string(&path).expect("read");
    assert!(csv.starts_with("file_path,action,holders,notes\n"));
    assert!(csv.contains("Common/a.h,rewritten,\"Kitware, Inc.\",\n"));
    assert!(csv.contains("Failed,1\n"));
  }

  #[test]
  fn test_file_report_round_trips_through_serde() {
    let report = FileReport::new(PathBuf::from("a.h"), FileAction::NoLicense).with_note("file is empty");
    let json = serde_json::to_string(&report).expect("serialize");
    let back: FileReport = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, report);
  }
}
