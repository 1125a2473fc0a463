//! Signal combination methods for ronda strategy composition.
//!
//! Per-strategy signal series are first outer-aligned on the union of their
//! timestamps ([`AlignedSignals`]); a strategy that has no value at a
//! timestamp votes 0 there. A [`Combiner`] then merges the aligned votes into
//! one decision per timestamp. Every method resolves ties and indecision to
//! hold (0).
//!
//! # Examples
//!
//! ```rust,no_run
//! use ronda_combine::{Combiner, MajorityVoteCombiner, SignalScore};
//! use ndarray::Array1;
//!
//! let signals = vec![
//!     SignalScore {
//!         name: "sma_crossover".to_string(),
//!         scores: Array1::from_vec(vec![1.0, -1.0, 1.0]),
//!     },
//!     SignalScore {
//!         name: "rsi_reversion".to_string(),
//!         scores: Array1::from_vec(vec![1.0, 1.0, 0.0]),
//!     },
//! ];
//!
//! let merged = MajorityVoteCombiner.combine(&signals).unwrap();
//! ```

mod align;
mod combiner;
mod method;
mod vote;
mod weighted;

// Re-export main types
pub use align::AlignedSignals;
pub use combiner::{Combiner, SignalScore};
pub use method::CombinationMethod;
pub use vote::{MajorityVoteCombiner, SingleCombiner, UnanimousCombiner};
pub use weighted::{WeightedAverageCombiner, WeightedAverageConfig};
