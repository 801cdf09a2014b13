//! Run configuration shared by the CLI and embedders.
//!
//! Validation happens before any rank starts coordinating: a configuration
//! that cannot work (too few ranks for the chosen pattern) is rejected
//! up front rather than discovered as a hang mid-protocol.

use crate::error::{PatternError, Result};

/// Which coordination pattern to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Pipeline,
    TreeSort,
    PhaseSort,
}

impl PatternKind {
    /// Smallest rank count the pattern can coordinate with.
    pub fn min_ranks(&self) -> usize {
        match self {
            // source + at least one worker + sink
            PatternKind::Pipeline => 3,
            // root + both first-level children
            PatternKind::TreeSort => 3,
            PatternKind::PhaseSort => 1,
        }
    }
}

/// Pattern selection plus rank count.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub pattern: PatternKind,
    pub ranks: usize,
}

impl RunOptions {
    pub fn validate(&self) -> Result<()> {
        if self.ranks < self.pattern.min_ranks() {
            return Err(PatternError::Config(format!(
                "{:?} needs at least {} ranks, got {}",
                self.pattern,
                self.pattern.min_ranks(),
                self.ranks
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_rejects_two_ranks() {
        let opts = RunOptions { pattern: PatternKind::Pipeline, ranks: 2 };
        assert!(matches!(opts.validate(), Err(PatternError::Config(_))));
    }

    #[test]
    fn phase_sort_runs_on_one_rank() {
        let opts = RunOptions { pattern: PatternKind::PhaseSort, ranks: 1 };
        assert!(opts.validate().is_ok());
    }
}
