//! Strategy registry and combination pipeline.
//!
//! A [`Composer`] is built once from a YAML registry of strategies, filters
//! and combinations. Executing a combination invokes each listed strategy
//! through the agent contract, aligns their signals on the dataset's time
//! index, merges them with the combination's method and finally forces
//! ineligible rows to hold.
//!
//! # Example
//!
//! ```ignore
//! use ronda_composer::Composer;
//!
//! let composer = Composer::from_path("config/strategies.yaml")?;
//! for name in composer.list_available_combinations() {
//!     let info = composer.get_combination_info(&name)?;
//!     println!("{name}: {} over {:?}", info.method, info.strategies);
//! }
//! let signals = composer.execute_combination("trend_consensus", &data)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::path::Path;

use ronda_traits::{MarketData, Result, SignalSeries};

pub mod agent;
pub mod catalog;
pub mod composer;
pub mod config;
pub mod report;

// Re-export main types
pub use agent::{CompositeAgent, TECHNICAL_ROLE};
pub use catalog::{Catalog, StrategyEntry};
pub use composer::{CombinationInfo, Composer, ComposerBuilder};
pub use config::{
    CombinationDefinition, DEFAULT_CONFIG_PATH, FailurePolicy, RegistryConfig, Settings,
    StrategyDefinition,
};
pub use report::{Execution, ExecutionReport, ExecutionStage, StrategyOutcome, StrategyStatus};

/// Runs `combination` from the registry at [`DEFAULT_CONFIG_PATH`].
///
/// Builds a fresh composer on every call; hold on to a [`Composer`] when
/// executing repeatedly.
pub fn get_signals(combination: &str, data: &MarketData) -> Result<SignalSeries> {
    get_signals_with_config(DEFAULT_CONFIG_PATH, combination, data)
}

/// Runs `combination` from the registry at `path`.
pub fn get_signals_with_config(
    path: impl AsRef<Path>,
    combination: &str,
    data: &MarketData,
) -> Result<SignalSeries> {
    Composer::from_path(path)?.execute_combination(combination, data)
}
