//! Execution stages and the report returned alongside a combined series.

use std::fmt;

use ronda_combine::CombinationMethod;
use ronda_traits::SignalSeries;
use serde::Serialize;

/// Pipeline stages of one combination execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStage {
    /// Nothing has happened yet.
    Idle,
    /// Looking up the combination and its strategies.
    Resolving,
    /// Running the strategies.
    Invoking,
    /// Aligning and combining their signals.
    Merging,
    /// Gating the combined signal by eligibility.
    Filtering,
    /// The series is complete.
    Done,
    /// A step failed.
    Failed,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Invoking => "invoking",
            Self::Merging => "merging",
            Self::Filtering => "filtering",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What happened to one strategy of a combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    /// The strategy produced this many signal rows.
    Signals {
        /// Rows produced, before alignment.
        rows: usize,
    },
    /// The strategy produced nothing and did not vote.
    Empty,
    /// The strategy failed and was left out under the skip policy.
    Skipped {
        /// The failure.
        error: String,
    },
}

/// Outcome of one strategy, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyStatus {
    /// Strategy name.
    pub name: String,
    /// Strategy role.
    pub role: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: StrategyOutcome,
}

/// Diagnostics of one combination execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Combination name.
    pub combination: String,
    /// Merge method used.
    pub method: CombinationMethod,
    /// Last stage reached; [`ExecutionStage::Done`] for a returned series.
    pub stage: ExecutionStage,
    /// Per-strategy outcomes, in declared order.
    pub strategies: Vec<StrategyStatus>,
    /// Directional signals forced to hold by the combination's filters.
    pub zeroed_by_filter: usize,
}

impl ExecutionReport {
    /// Names of strategies skipped after failing.
    pub fn skipped(&self) -> impl Iterator<Item = &str> + '_ {
        self.strategies
            .iter()
            .filter(|s| matches!(s.outcome, StrategyOutcome::Skipped { .. }))
            .map(|s| s.name.as_str())
    }

    /// Whether every listed strategy ran without failing.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped().next().is_none()
    }
}

/// A combined signal series with its execution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    /// The final signal series.
    pub signals: SignalSeries,
    /// How it was produced.
    pub report: ExecutionReport,
}
