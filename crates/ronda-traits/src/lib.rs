#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Execution contract for the Ronda strategy composition engine.
//!
//! This crate provides the foundational abstractions shared by strategies,
//! filters and the composer: the per-invocation [`Context`], the standardized
//! [`Output`] envelope, the [`Agent`] contract every strategy is invoked
//! through, and the discrete [`Signal`] containers they produce.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod agent;
pub mod context;
pub mod error;
pub mod output;
pub mod signal;
pub mod strategy;
pub mod types;

// Re-exports
pub use agent::{Agent, AgentIdentity, DIRECTIONAL_ROLE};
pub use context::{ALTERNATIVE_DISCLOSURES, Context, NEWS_DATA, PRICE_DATA};
pub use error::{Result, RondaError};
pub use output::{AGENT_NAME_KEY, AGENT_ROLE_KEY, Output};
pub use signal::{SIGNAL_COLUMN, Signal, SignalPanel, SignalPayload, SignalSeries};
pub use strategy::Strategy;
pub use types::{MarketData, SYMBOL_COLUMN, Symbol, TIMESTAMP_COLUMNS, Timestamp};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
