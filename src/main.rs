//! # relicense
//!
//! Rewrites the license headers of a C-family source tree.

use std::process::ExitCode;

use relicense::cli::{Cli, exit_code_for, run_relicense};

fn main() -> ExitCode {
  let cli = Cli::parse_args();

  match run_relicense(cli.run_args) {
    Ok(code) => code,
    Err(e) => {
      eprintln!("ERROR: {:#}", e);
      exit_code_for(&e)
    }
  }
}
