//! # Segmenter Module
//!
//! The marker state machine that splits the top of a file into license blocks
//! and ordinary content. Both the scanner and the rewriter drive the same
//! [`Segmenter`], so the ranges the scanner reads holders from are exactly the
//! ranges the rewriter removes.

use crate::config::HeaderRules;

/// The role a single line plays in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
  /// Ordinary content, emitted unchanged.
  Content,
  /// The line that opened a block with marker pair `pair`.
  BlockStart { pair: usize },
  /// A line strictly inside an open block.
  BlockBody { pair: usize },
  /// The line that closed the open block.
  BlockEnd { pair: usize },
  /// The guard line that ends the header region. `interrupted` carries the
  /// pair of a block that was still open and is now unterminated.
  HeaderEnd { interrupted: Option<usize> },
}

impl LineRole {
  /// Whether the line belongs to a license block.
  pub const fn is_block(self) -> bool {
    matches!(
      self,
      LineRole::BlockStart { .. } | LineRole::BlockBody { .. } | LineRole::BlockEnd { .. }
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
  Outside,
  Inside { pair: usize },
}

/// Per-file scan context: block state plus the "header ended" latch.
///
/// A fresh segmenter must be created for every file.
pub struct Segmenter<'r> {
  rules: &'r HeaderRules,
  state: State,
  header_ended: bool,
}

impl<'r> Segmenter<'r> {
  pub const fn new(rules: &'r HeaderRules) -> Self {
    Self {
      rules,
      state: State::Outside,
      header_ended: false,
    }
  }

  /// Classifies the next line and advances the state machine.
  pub fn feed(&mut self, line: &str) -> LineRole {
    if self.header_ended {
      return LineRole::Content;
    }

    if self.rules.header_end.iter().any(|guard| line.contains(guard.as_str())) {
      self.header_ended = true;
      let interrupted = self.open_pair();
      self.state = State::Outside;
      return LineRole::HeaderEnd { interrupted };
    }

    match self.state {
      State::Outside => match self.rules.markers.iter().position(|m| line.contains(m.start.as_str())) {
        Some(pair) => {
          self.state = State::Inside { pair };
          LineRole::BlockStart { pair }
        }
        None => LineRole::Content,
      },
      State::Inside { pair } => {
        if line.contains(self.rules.markers[pair].stop.as_str()) {
          self.state = State::Outside;
          LineRole::BlockEnd { pair }
        } else {
          LineRole::BlockBody { pair }
        }
      }
    }
  }

  /// The pair of the block that is currently open, if any. At end of input
  /// this is the unterminated block.
  pub const fn open_pair(&self) -> Option<usize> {
    match self.state {
      State::Inside { pair } => Some(pair),
      State::Outside => None,
    }
  }

  pub const fn header_ended(&self) -> bool {
    self.header_ended
  }
}
