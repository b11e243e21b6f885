//! # relicense
//!
//! A tool that rewrites the license header blocks at the top of C-family source
//! files into one normalized copyright banner.
//!
//! `relicense` walks a source tree, finds the license comment blocks delimited
//! by configured marker pairs, works out which known copyright holders they
//! mention, and replaces every block with a standardized banner attributing
//! those holders. Everything outside the blocks is left byte-for-byte intact,
//! each file is replaced atomically, and running the tool twice changes
//! nothing the second time.
//!
//! ## Features
//!
//! * Streaming, line-oriented block recognition with ordered marker pairs
//! * Case-insensitive holder detection from a small fixed vocabulary
//! * Atomic rewrite through a temporary file in the target directory
//! * Dry-run mode with unified diffs
//! * JSON and CSV reports
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use relicense::config::Config;
//! use relicense::processor::{Processor, ProcessorConfig};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Built-in VTK-style defaults, rewriting files in place
//!     let processor = Processor::new(ProcessorConfig::new(Config::default()))?;
//!
//!     let outcome = processor.run(Path::new("Common"))?;
//!     if outcome.has_failures() {
//!         println!("Some files could not be rewritten");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`processor`] - Collection, scanning and rewriting of files
//! * [`banner`] - Rendering and verification of the replacement banner
//! * [`config`] - Marker, holder and banner configuration
//! * [`logging`] - Logging utilities for verbose output
//!
//! [`processor`]: crate::processor
//! [`banner`]: crate::banner
//! [`config`]: crate::config
//! [`logging`]: crate::logging

pub mod banner;
pub mod cli;
pub mod config;
pub mod diff;
pub mod file_filter;
pub mod holder_detection;
pub mod logging;
pub mod output;
pub mod processor;
pub mod report;
