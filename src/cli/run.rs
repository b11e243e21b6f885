//! # Run Command
//!
//! This module implements the single relicense command: load the
//! configuration, rewrite the tree, print the summary and write the requested
//! reports.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, load_config};
use crate::diff::DiffManager;
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::output::{
  CategorizedReports, print_blank_line, print_failed_files, print_missing_license_files, print_rewritten_files,
  print_summary,
};
use crate::processor::{Processor, ProcessorConfig};
use crate::report::{ReportFormat, ReportGenerator};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
  /// Root directory of the source tree (a single file is accepted too)
  pub root: PathBuf,

  /// 1 prints every discovered file and debug diagnostics
  #[arg(
    value_name = "VERBOSE",
    default_value_t = 0,
    value_parser = clap::value_parser!(u8).range(0..=1)
  )]
  pub verbose: u8,

  /// Path to config file (default: $RELICENSE_CONFIG, then .relicense.toml in
  /// the root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config files even if present and use the built-in defaults
  #[arg(long, conflicts_with = "config")]
  pub no_config: bool,

  /// Compute the rewrites without modifying any file
  #[arg(long)]
  pub dry_run: bool,

  /// Show a diff of every change (requires --dry-run)
  #[arg(long, requires = "dry_run")]
  pub show_diff: bool,

  /// Append a diff of every change to a file (requires --dry-run)
  #[arg(long, value_name = "FILE", requires = "dry_run")]
  pub save_diff: Option<PathBuf>,

  /// Write a JSON report of what happened to each file
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Write a CSV report of what happened to each file
  #[arg(long, value_name = "OUTPUT")]
  pub report_csv: Option<PathBuf>,

  /// Suppress all output except errors
  #[arg(short, long)]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

/// Errors that stop a run before any file is touched, besides
/// [`ConfigError`].
#[derive(Debug, Error)]
pub enum SetupError {
  #[error("Root does not exist: {0}")]
  MissingRoot(PathBuf),
}

/// Maps a failed run to the process exit status.
///
/// Setup problems exit with 2, everything else with 1.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
  if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<SetupError>().is_some() {
    ExitCode::from(2)
  } else {
    ExitCode::from(1)
  }
}

/// Run relicense with the given arguments.
///
/// Returns the exit status for a run that got past setup: success, or 1 if
/// any file failed.
pub fn run_relicense(args: RunArgs) -> anyhow::Result<ExitCode> {
  let verbose = args.verbose > 0;
  init_tracing(args.quiet, verbose);

  if verbose {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  if !args.root.exists() {
    return Err(SetupError::MissingRoot(args.root).into());
  }

  let config_dir = config_search_dir(&args.root);
  let config = load_config(args.config.as_deref(), config_dir, args.no_config)?;

  let processor = Processor::new(ProcessorConfig {
    dry_run: args.dry_run,
    diff_manager: Some(DiffManager::new(args.show_diff, args.save_diff)),
    ..ProcessorConfig::new(config)
  })?;

  debug!("Processing root: {}", args.root.display());
  let outcome = processor.run(&args.root)?;

  let summary = outcome.summary();
  let categorized = CategorizedReports::from_reports(&outcome.reports);
  let root = Some(args.root.as_path());

  print_blank_line();
  print_rewritten_files(&categorized.rewritten, root, args.dry_run);
  if !categorized.missing.is_empty() {
    print_blank_line();
    print_missing_license_files(&categorized.missing, root);
  }
  print_failed_files(&categorized.failed, root);

  print_blank_line();
  print_summary(&summary);

  let reports = [
    (ReportFormat::Json, args.report_json.as_ref()),
    (ReportFormat::Csv, args.report_csv.as_ref()),
  ];
  for (format, path) in reports {
    let Some(output_path) = path else {
      continue;
    };
    ReportGenerator::new(format, output_path).generate(&outcome.reports, &summary)?;
    info_log!("Generated {} report at {}", format, output_path.display());
  }

  if outcome.has_failures() {
    return Ok(ExitCode::from(1));
  }
  Ok(ExitCode::SUCCESS)
}

/// Directory searched for `.relicense.toml`: the root, or its parent when the
/// root is a single file.
fn config_search_dir(root: &Path) -> &Path {
  if root.is_file() {
    root.parent().unwrap_or(root)
  } else {
    root
  }
}
