//! Strategy implementations for the ronda composition engine.
//!
//! This crate provides concrete rule-based strategies over precomputed
//! indicator columns:
//! - Trend: SMA crossover
//! - Reversion: RSI reversion, Bollinger bounce
//! - Momentum: MACD cross
//!
//! Each strategy emits one signal per row in {-1, 0, +1}.
//! [`StrategyAgent`] lifts any strategy into the agent execution contract,
//! and the [`registry`] builds strategies from configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ronda_strategies::{StrategyAgent, technical::SmaCrossover};
//! use ronda_traits::{Agent, AgentIdentity, Context};
//!
//! let agent = StrategyAgent::new(
//!     AgentIdentity::new("trend", "directional"),
//!     Arc::new(SmaCrossover::default()),
//! );
//! let output = agent.invoke(&Context::from_price_data(data)?)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod agent;
pub mod registry;
pub mod technical;

// Re-export key types
pub use agent::{DataSelector, StrategyAgent};
pub use registry::{StrategyCategory, StrategyInfo, available_strategies, build_strategy};
