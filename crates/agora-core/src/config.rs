//! Debate configuration
//!
//! Defaults match the reference experiments. Layering over files and the
//! environment happens in the binary's settings loader.

use serde::{Deserialize, Serialize};

use crate::error::{DebateError, Result};
use crate::graph::ArgumentId;
use crate::valuation::{
    ValuationStrategy, Valuator, DEFAULT_CONVERGENCE_THRESHOLD, DEFAULT_MAX_ITERATIONS,
};

/// Default comfort tolerance around an agent's target valuation
pub const DEFAULT_COMFORT: f64 = 0.05;

/// How an agent picks among candidate moves that close the gap equally well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TieBreak {
    /// Scan candidates in canonical order; only a strictly smaller gap
    /// replaces the current best, so ties go to the lexicographically
    /// smallest identifier (`"10"` before `"2"`)
    #[default]
    FirstImprovement,
    /// Reproducible random choice among equally-best candidates
    Seeded { seed: u64 },
}

/// Full debate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Identifier of the issue argument
    pub issue: String,
    /// Comfort tolerance `cl` given to every agent
    pub comfort: f64,
    /// Valuation strategy
    pub strategy: ValuationStrategy,
    /// Iterative stop threshold on the summed per-round change
    pub convergence_threshold: f64,
    /// Iterative round cap
    pub max_iterations: usize,
    /// Candidate tie-breaking rule
    pub tie_break: TieBreak,
    /// Evaluate orderings on the rayon pool
    pub parallel: bool,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            issue: "0".to_string(),
            comfort: DEFAULT_COMFORT,
            strategy: ValuationStrategy::Iterative,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tie_break: TieBreak::FirstImprovement,
            parallel: false,
        }
    }
}

impl DebateConfig {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.comfort.is_finite() || self.comfort < 0.0 {
            return Err(DebateError::InvalidConfig(format!(
                "comfort must be a non-negative number, got {}",
                self.comfort
            )));
        }
        if !self.convergence_threshold.is_finite() || self.convergence_threshold <= 0.0 {
            return Err(DebateError::InvalidConfig(format!(
                "convergence_threshold must be positive, got {}",
                self.convergence_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(DebateError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.issue.is_empty() {
            return Err(DebateError::InvalidConfig("issue must not be empty".to_string()));
        }
        Ok(())
    }

    /// The issue as an argument identifier
    pub fn issue_id(&self) -> ArgumentId {
        ArgumentId::new(self.issue.clone())
    }

    /// Valuator described by this configuration
    pub fn valuator(&self) -> Valuator {
        Valuator {
            strategy: self.strategy,
            convergence_threshold: self.convergence_threshold,
            max_iterations: self.max_iterations,
        }
    }
}
