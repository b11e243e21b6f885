//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod run;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
pub use run::{RunArgs, SetupError, exit_code_for, run_relicense};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Rewrite every header under the VTK source tree
  relicense ~/src/VTK

  # Same, printing every discovered file
  relicense ~/src/VTK 1

  # Show what would change without touching any file
  relicense --dry-run --show-diff ~/src/VTK

  # Use a project-specific marker and holder vocabulary
  relicense --config relicense.toml ~/src/ParaView

  # Write a JSON report of what happened to each file
  relicense --report-json report.json ~/src/VTK

Exit status: 0 on success, 1 if any file could not be processed, 2 on a
configuration or setup error.
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub run_args: RunArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
