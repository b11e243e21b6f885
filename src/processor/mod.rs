//! # Processor Module
//!
//! This module contains the core functionality for finding license blocks at
//! the top of C-family sources and replacing them with a normalized banner.
//!
//! The module is organized into several submodules:
//! - [`file_collector`] - Directory traversal and candidate selection
//! - [`segmenter`] - The marker state machine shared by scanner and rewriter
//! - [`block_scanner`] - Records holders mentioned inside license blocks
//! - [`holder_resolver`] - Turns scan results into rewrite decisions
//! - [`block_rewriter`] - Replaces the blocks with the banner
//! - [`file_io`] - Line streaming and atomic file replacement
//!
//! The [`Processor`] struct is the main entry point, running the
//! collect, scan, resolve and rewrite phases over a tree one file at a time.

pub mod block_rewriter;
pub mod block_scanner;
pub mod file_collector;
pub mod file_io;
pub mod holder_resolver;
pub mod segmenter;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
pub use block_rewriter::{BlockRewriter, RewriteError, RewriteOutcome};
pub use block_scanner::{BlockScanner, NoLicenseReason, Observation, ScanResult};
pub use file_collector::{Collection, FileCollector};
pub use file_io::LineEnding;
pub use holder_resolver::{Resolution, resolve};
use tracing::{debug, error};

use crate::banner::Banner;
use crate::config::{Config, HeaderRules, Holder};
use crate::diff::DiffManager;
use crate::holder_detection::{HolderDetector, SubstringHolderDetector};
use crate::output::{Progress, print_start_message};
use crate::report::{FileAction, FileReport, ProcessingSummary};
use crate::{verbose_log, warn_log};

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub config: Config,

  /// Compute rewrites without touching any file
  pub dry_run: bool,

  // Optional components
  pub diff_manager: Option<DiffManager>,
  pub holder_detector: Option<Box<dyn HolderDetector>>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     dry_run: true,
  ///     ..ProcessorConfig::new(config)
  /// }
  /// ```
  pub fn new(config: Config) -> Self {
    Self {
      config,
      dry_run: false,
      diff_manager: None,
      holder_detector: None,
    }
  }
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchOutcome {
  /// One report per candidate file, in processing order.
  pub reports: Vec<FileReport>,
  pub elapsed: Duration,
}

impl BatchOutcome {
  pub fn summary(&self) -> ProcessingSummary {
    ProcessingSummary::from_reports(&self.reports, self.elapsed)
  }

  pub fn has_failures(&self) -> bool {
    self.reports.iter().any(|r| r.action == FileAction::Failed)
  }
}

/// Processor for rewriting license headers.
///
/// The `Processor` is responsible for:
/// - Collecting candidate files under a root
/// - Scanning each file for license blocks and holders
/// - Rewriting the header, or previewing it in dry-run mode
/// - Collecting report data about processed files
///
/// All configuration is validated in [`Processor::new`], before any file is
/// touched.
pub struct Processor {
  rules: HeaderRules,
  banner: Banner,
  detector: Box<dyn HolderDetector>,
  file_collector: FileCollector,
  dry_run: bool,
  diff_manager: DiffManager,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`](crate::config::ConfigError) if the marker
  /// configuration is inconsistent or the banner would not be recognized on a
  /// second run.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    config.config.validate()?;
    let rules = config.config.header_rules()?;
    let banner = Banner::from_config(&config.config.banner);
    let detector: Box<dyn HolderDetector> = match config.holder_detector {
      Some(detector) => detector,
      None => Box::new(SubstringHolderDetector::new(&rules.holders)),
    };

    banner.verify(&rules, detector.as_ref())?;

    debug!(
      "Processor ready: {} marker pair(s), {} holder(s), dry_run = {}",
      rules.markers.len(),
      rules.holders.len(),
      config.dry_run
    );

    Ok(Self {
      file_collector: FileCollector::new(&config.config.extensions, &config.config.exclude),
      rules,
      banner,
      detector,
      dry_run: config.dry_run,
      diff_manager: config.diff_manager.unwrap_or_default(),
    })
  }

  /// Collects the candidate files under `root`.
  pub fn collect(&self, root: &Path) -> Result<Collection> {
    self.file_collector.collect(root)
  }

  /// Scans one file without changing it.
  pub fn scan_file(&self, path: &Path) -> Result<ScanResult> {
    BlockScanner::new(&self.rules, self.detector.as_ref()).scan_file(path)
  }

  /// Runs scan, resolve and rewrite on one file.
  ///
  /// Files without a usable license yield a report, not an error. Errors are
  /// I/O or rename failures.
  pub fn process_file(&self, path: &Path) -> Result<FileReport> {
    let scan = self.scan_file(path)?;

    let holders = match resolve(&scan) {
      Resolution::Skip(reason) => {
        let action = if reason == NoLicenseReason::EmptyFile {
          FileAction::Empty
        } else {
          FileAction::NoLicense
        };
        return Ok(FileReport::new(path.to_path_buf(), action).with_note(reason.to_string()));
      }
      Resolution::Rewrite(holders) => holders,
    };

    let outcome = self.rewrite(path, &holders)?;
    let action = match outcome {
      RewriteOutcome::Rewritten => {
        verbose_log!(
          "{}: {}",
          if self.dry_run { "Would rewrite" } else { "Rewrote" },
          path.display()
        );
        FileAction::Rewritten
      }
      RewriteOutcome::Unchanged => FileAction::Unchanged,
    };

    let names = holders.iter().map(|h| h.name.clone()).collect();
    Ok(FileReport::new(path.to_path_buf(), action).with_holders(names))
  }

  fn rewrite(&self, path: &Path, holders: &[Holder]) -> Result<RewriteOutcome> {
    let rewriter = BlockRewriter::new(&self.rules, &self.banner);

    if !self.dry_run {
      return rewriter.rewrite_file(path, holders);
    }

    let (outcome, original, rewritten) = rewriter.preview_file(path, holders)?;
    if outcome == RewriteOutcome::Rewritten {
      self.diff_manager.display_diff(path, &original, &rewritten)?;
    }
    Ok(outcome)
  }

  /// Processes every candidate file under `root`, one at a time.
  ///
  /// Per-file failures are recorded and the batch continues. Only a root that
  /// cannot be walked at all is an error.
  pub fn run(&self, root: &Path) -> Result<BatchOutcome> {
    let start_time = Instant::now();
    let collection = self.collect(root)?;

    for warning in &collection.warnings {
      warn_log!("{}", warning);
    }

    let files = collection.files;
    print_start_message(files.len());

    let mut progress = Progress::new(files.len());
    let mut reports = Vec::with_capacity(files.len());

    for path in &files {
      let report = self.process_file(path).unwrap_or_else(|e| failed_report(path, &e));

      match report.action {
        FileAction::Empty | FileAction::NoLicense => {
          progress.interrupt();
          warn_log!(
            "{}: {}",
            path.display(),
            report.note.as_deref().unwrap_or_default()
          );
        }
        FileAction::Failed => {
          progress.interrupt();
          error!("{}", report.note.as_deref().unwrap_or_default());
        }
        FileAction::Rewritten | FileAction::Unchanged => {}
      }

      reports.push(report);
      progress.tick();
    }
    progress.finish();

    Ok(BatchOutcome {
      reports,
      elapsed: start_time.elapsed(),
    })
  }
}

fn failed_report(path: &Path, err: &anyhow::Error) -> FileReport {
  FileReport::new(PathBuf::from(path), FileAction::Failed).with_note(format!("{:#}", err))
}
