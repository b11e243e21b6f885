//! # Holder Detection Module
//!
//! This module contains the interface and default implementation for deciding
//! which copyright holders a license line mentions. The scanner only talks to
//! the [`HolderDetector`] trait, so the matching rule can be swapped without
//! touching the block state machine.

use crate::config::Holder;

/// Trait for holder detectors.
///
/// Implementations report every known holder mentioned by a single line of a
/// license block.
pub trait HolderDetector {
  /// Returns the holders mentioned by `line`, in vocabulary order.
  fn holders_in<'a>(&'a self, line: &str) -> Vec<&'a Holder>;
}

/// Default implementation of holder detection.
///
/// A holder is mentioned when the lower-cased line contains its token. This is
/// a fixed vocabulary lookup, not legal analysis.
pub struct SubstringHolderDetector {
  holders: Vec<Holder>,
}

impl SubstringHolderDetector {
  /// Creates a detector over `holders`. Tokens are lower-cased here so callers
  /// may pass the vocabulary as written in the config.
  pub fn new(holders: &[Holder]) -> Self {
    let holders = holders
      .iter()
      .map(|h| Holder {
        token: h.token.to_lowercase(),
        name: h.name.clone(),
        notice: h.notice.clone(),
      })
      .collect();
    Self { holders }
  }
}

impl HolderDetector for SubstringHolderDetector {
  fn holders_in<'a>(&'a self, line: &str) -> Vec<&'a Holder> {
    let line_lower = line.to_lowercase();
    self
      .holders
      .iter()
      .filter(|h| line_lower.contains(h.token.as_str()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::default_holders;

  #[test]
  fn test_substring_holder_detector() {
    let detector = SubstringHolderDetector::new(&default_holders());

    let found = detector.holders_in("  Copyright (c) KITWARE, Inc.");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].token, "kitware");

    let found = detector.holders_in("  See http://www.kitware.com/Copyright.htm and Sandia Corporation");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].token, "kitware");
    assert_eq!(found[1].token, "sandia");

    assert!(detector.holders_in("  All rights reserved.").is_empty());
  }

  #[test]
  fn test_mixed_case_tokens_are_normalized() {
    let detector = SubstringHolderDetector::new(&[Holder::new("NTESS", "NTESS", "Copyright-NTESS.txt")]);
    assert_eq!(detector.holders_in("Copyright 2020 ntess").len(), 1);
  }
}
