//! # Logging Module
//!
//! This module provides logging utilities for the relicense tool, including:
//! - Verbose logging that can be enabled/disabled
//! - Standard info logging with color support
//! - Warnings for files that are left untouched
//!
//! Verbose logs and warnings go to stderr, info logs go to stdout so the file
//! count and summary stay pipeable. Structured diagnostics go through
//! `tracing`, see [`init_tracing`].
//!
//! ## Example
//!
//! ```rust
//! use relicense::logging::{ColorMode, set_verbose};
//! use relicense::{info_log, verbose_log};
//!
//! // Enable verbose logging
//! set_verbose();
//!
//! // Set color mode to Auto (uses owo-colors' automatic TTY detection)
//! ColorMode::Auto.apply();
//!
//! // Log a verbose message (goes to stderr)
//! verbose_log!("Discovered: {}", "vtkObject.h");
//!
//! // Log an info message (goes to stdout)
//! info_log!("Rewrote header of: {}", "vtkObject.h");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_normal, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// This macro is used for detailed logging that is only shown when verbose mode
/// is enabled via [`set_verbose`]. It uses the same format string syntax as
/// the standard [`eprintln!`] macro.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
///
/// This macro is used for important information that should always be displayed
/// to the user. It uses the same format string syntax as the standard
/// [`println!`] macro.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Logs a warning to stderr unless quiet mode is enabled.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_warn_log(&format!($($arg)*));
        }
    };
}

/// Internal function to print info log messages with formatting.
///
/// This function is used by the [`info_log!`] macro to format and print
/// messages with colors if enabled.
///
/// # Parameters
///
/// * `message` - The message to print
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}

/// Internal function used by [`warn_log!`].
pub fn print_warn_log(message: &str) {
  eprintln!(
    "{} {}",
    "warning:".if_supports_color(Stream::Stderr, |m| m.yellow()),
    message
  );
}
