use std::sync::atomic::{AtomicU8, Ordering};

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Global output mode shared by the logging macros.
///
/// This is initialized to `Normal`, meaning verbose logging is disabled until
/// explicitly enabled via [`set_verbose`].
static OUTPUT_MODE: AtomicU8 = AtomicU8::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
  Normal = 0,
  Quiet = 1,
  Verbose = 2,
}

impl OutputMode {
  /// Convert from u8 to OutputMode
  const fn from_u8(value: u8) -> Self {
    match value {
      1 => OutputMode::Quiet,
      2 => OutputMode::Verbose,
      _ => OutputMode::Normal,
    }
  }
}

/// Enum representing the color mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
  /// Automatically determine whether to use colors based on TTY detection
  Auto,
  /// Never use colors
  Never,
  /// Always use colors
  Always,
}

impl ColorMode {
  /// Applies the color mode to every `owo-colors` stream.
  ///
  /// `Auto` leaves the decision to the `supports-colors` detection done by
  /// `if_supports_color`.
  pub fn apply(self) {
    match self {
      ColorMode::Auto => owo_colors::unset_override(),
      ColorMode::Never => owo_colors::set_override(false),
      ColorMode::Always => owo_colors::set_override(true),
    }
  }
}

/// Sets the global verbose logging flag.
///
/// When verbose logging is enabled, the [`verbose_log!`] macro will output
/// messages to stderr. When disabled, verbose log messages are suppressed.
pub fn set_verbose() {
  OUTPUT_MODE.store(OutputMode::Verbose as u8, Ordering::SeqCst);
}

/// Suppresses everything except errors.
pub fn set_quiet() {
  OUTPUT_MODE.store(OutputMode::Quiet as u8, Ordering::SeqCst);
}

/// Restores the default output mode.
pub fn set_normal() {
  OUTPUT_MODE.store(OutputMode::Normal as u8, Ordering::SeqCst);
}

/// Checks if verbose logging is currently enabled.
///
/// This function is used internally by the [`verbose_log!`] macro to determine
/// whether to output verbose log messages.
pub fn is_verbose() -> bool {
  let mode_u8 = OUTPUT_MODE.load(Ordering::SeqCst);
  matches!(OutputMode::from_u8(mode_u8), OutputMode::Verbose)
}

/// Checks if quiet mode is currently enabled.
pub fn is_quiet() -> bool {
  let mode_u8 = OUTPUT_MODE.load(Ordering::SeqCst);
  matches!(OutputMode::from_u8(mode_u8), OutputMode::Quiet)
}

/// Installs the global `tracing` subscriber.
///
/// The level follows the output mode (`error` when quiet, `debug` when
/// verbose, `warn` otherwise) unless `RUST_LOG` is set. Events are written to
/// stderr so they never interleave with the stdout summary. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_tracing(quiet: bool, verbose: bool) {
  let default_level = if quiet {
    "error"
  } else if verbose {
    "debug"
  } else {
    "warn"
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_output_mode_round_trip() {
    set_quiet();
    assert!(is_quiet());
    assert!(!is_verbose());

    set_verbose();
    assert!(is_verbose());
    assert!(!is_quiet());

    set_normal();
    assert!(!is_verbose());
    assert!(!is_quiet());
  }

  #[test]
  fn test_output_mode_from_invalid_value_is_normal() {
    assert_eq!(OutputMode::from_u8(42), OutputMode::Normal);
  }
}
