//! # Holder Resolver Module
//!
//! Turns a [`ScanResult`] into the decision the rewriter acts on.

use super::block_scanner::{NoLicenseReason, ScanResult};
use crate::config::Holder;

/// What to do with a scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// Leave the file alone and warn.
  Skip(NoLicenseReason),
  /// Rewrite the header, one attribution line per holder in this order.
  Rewrite(Vec<Holder>),
}

/// Resolves the distinct holders of a scan, in first-occurrence order.
///
/// Observations differing only in their markers collapse to one holder, so a
/// holder named by several blocks is attributed once.
pub fn resolve(scan: &ScanResult) -> Resolution {
  match scan {
    ScanResult::NoLicense(reason) => Resolution::Skip(*reason),
    ScanResult::Found(observations) => {
      let mut holders: Vec<Holder> = Vec::with_capacity(observations.len());
      for observation in observations {
        if !holders.contains(&observation.holder) {
          holders.push(observation.holder.clone());
        }
      }
      Resolution::Rewrite(holders)
    }
  }
}

#[cfg(test)]
mod tests {
  use indexmap::IndexSet;

  use super::*;
  use crate::processor::block_scanner::Observation;

  fn observation(start: &str, token: &str, stop: Option<&str>) -> Observation {
    Observation {
      start_marker: start.to_string(),
      holder: Holder::new(token, token, "Copyright.txt"),
      stop_marker: stop.map(str::to_string),
    }
  }

  #[test]
  fn test_sentinel_resolves_to_skip() {
    let scan = ScanResult::NoLicense(NoLicenseReason::NoBlock);
    assert_eq!(resolve(&scan), Resolution::Skip(NoLicenseReason::NoBlock));
  }

  #[test]
  fn test_order_follows_observations() {
    let observations: IndexSet<_> = [
      observation("/*====", "sandia", Some("====*/")),
      observation("/*====", "kitware", Some("====*/")),
    ]
    .into_iter()
    .collect();

    let Resolution::Rewrite(holders) = resolve(&ScanResult::Found(observations)) else {
      panic!("expected rewrite");
    };
    let tokens: Vec<_> = holders.iter().map(|h| h.token.as_str()).collect();
    assert_eq!(tokens, vec!["sandia", "kitware"]);
  }

  #[test]
  fn test_holder_from_several_blocks_is_attributed_once() {
    let observations: IndexSet<_> = [
      observation("/*====", "kitware", Some("====*/")),
      observation("/*----", "kitware", None),
    ]
    .into_iter()
    .collect();

    assert_eq!(
      resolve(&ScanResult::Found(observations)),
      Resolution::Rewrite(vec![Holder::new("kitware", "kitware", "Copyright.txt")])
    );
  }
}
