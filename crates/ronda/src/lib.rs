#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Strategy composition and filtering engine for trading signals.
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience. It provides a unified API for running independent trading
//! strategies, merging their discrete signals and gating the result by
//! eligibility rules.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::{Composer, MarketData, Result};
//!
//! # fn main() -> Result<()> {
//! let composer = Composer::from_path("config/strategies.yaml")?;
//! let data: MarketData = load_prices()?;
//!
//! for name in composer.list_available_combinations() {
//!     let signals = composer.execute_combination(&name, &data)?;
//!     let (sell, hold, buy) = signals.counts();
//!     println!("{name}: {buy} buy / {hold} hold / {sell} sell");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Execution contract ([`Agent`], [`Context`], [`Output`], [`Signal`])
//! - [`strategies`] - Built-in technical strategies and the strategy agent adapter
//! - [`combine`] - Signal combination methods
//! - [`filters`] - Eligibility filters and their composition
//! - [`composer`] - Registry configuration and the combination pipeline
//!
//! ## Architecture
//!
//! 1. **Strategies** turn a dataset into one signal per row in {-1, 0, +1}
//! 2. **Agents** wrap strategies in a uniform invoke contract
//! 3. **Combiners** merge aligned signals by vote or weighted average
//! 4. **Filters** force ineligible rows to hold

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Execution Contract
// ============================================================================

/// Core types shared by every ronda crate.
pub mod traits {
    pub use ronda_traits::*;
}

// Re-export the contract at top level for convenience
pub use ronda_traits::{
    Agent, AgentIdentity, Context, MarketData, Output, Signal, SignalPayload, SignalSeries,
    Strategy, Timestamp,
};

// Re-export error types
pub use ronda_traits::{Result, RondaError};

// ============================================================================
// Strategies
// ============================================================================

/// Built-in strategies and the agent adapter.
///
/// ## Available Strategies
///
/// - **SMACrossover**: fast vs slow moving average
/// - **RSIReversion**: oversold buys, overbought sells
/// - **MACDCross**: MACD crossing its signal line
/// - **BollingerBounce**: close outside the bands
pub mod strategies {
    pub use ronda_strategies::*;
}

// ============================================================================
// Signal Combination
// ============================================================================

/// Signal combination methods.
///
/// ## Available Methods
///
/// - **majority_vote**: sign of the vote sum, ties hold
/// - **unanimous**: direction only when every strategy agrees
/// - **weighted_average**: normalized weighted score against a hold band
/// - **single**: pass-through of exactly one strategy
pub mod combine {
    pub use ronda_combine::*;
}

pub use ronda_combine::CombinationMethod;

// ============================================================================
// Eligibility Filters
// ============================================================================

/// Eligibility filters.
///
/// Filters produce a boolean mask over a dataset; the composer forces
/// signals on ineligible rows to hold.
pub mod filters {
    pub use ronda_filters::*;
}

pub use ronda_filters::{CompositeFilter, EligibilityFilter, FilterLogic};

// ============================================================================
// Composer
// ============================================================================

/// Registry configuration and combination execution.
pub mod composer {
    pub use ronda_composer::*;
}

pub use ronda_composer::{
    CombinationInfo, Composer, CompositeAgent, RegistryConfig, get_signals,
    get_signals_with_config,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Agent, Composer, Context, EligibilityFilter, Strategy};
    pub use crate::{MarketData, Output, Signal, SignalSeries};
    pub use crate::{Result, RondaError};
}

// ============================================================================
// Tests
// ============================================================================
