//! Core trait definition for signal combiners.

use ndarray::Array1;
use ronda_traits::{Result, RondaError, Signal};

/// Aligned votes of a single strategy, ready for combination.
///
/// Each entry is the strategy's signal value (-1, 0 or +1) at one timestamp of
/// the shared index; timestamps the strategy did not cover hold 0.
#[derive(Debug, Clone)]
pub struct SignalScore {
    /// Strategy name (used to look up weights and in error messages)
    pub name: String,

    /// Signal values on the shared index
    pub scores: Array1<f64>,
}

impl SignalScore {
    /// Builds a score row from discrete signals.
    pub fn from_signals(name: impl Into<String>, signals: &[Signal]) -> Self {
        Self {
            name: name.into(),
            scores: signals.iter().map(|&s| f64::from(s)).collect(),
        }
    }
}

/// Merges several strategies' aligned votes into one decision vector.
///
/// The returned vector has the same length as the inputs and contains only
/// -1, 0 or +1. Whenever the inputs do not determine a direction the result
/// is 0. All implementations must be thread-safe (Send + Sync).
///
/// # Examples
///
/// ```rust,no_run
/// use ronda_combine::{Combiner, SignalScore};
/// use ndarray::Array1;
///
/// struct FirstWins;
///
/// impl Combiner for FirstWins {
///     fn combine(&self, signals: &[SignalScore]) -> ronda_traits::Result<Array1<f64>> {
///         Ok(signals[0].scores.clone())
///     }
///
///     fn name(&self) -> &str {
///         "first_wins"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Combine aligned votes into a decision vector.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No signals are provided
    /// - Signal vectors have mismatched lengths
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>>;

    /// Name of this combination method.
    fn name(&self) -> &str;
}

/// Checks that `signals` is non-empty and equally long; returns that length.
pub(crate) fn validate(signals: &[SignalScore]) -> Result<usize> {
    let first = signals
        .first()
        .ok_or_else(|| RondaError::InvalidData("Cannot combine zero signals".to_string()))?;
    let len = first.scores.len();

    if let Some(bad) = signals.iter().find(|s| s.scores.len() != len) {
        return Err(RondaError::InvalidData(format!(
            "Signal '{}' has {} rows, expected {}",
            bad.name,
            bad.scores.len(),
            len
        )));
    }
    Ok(len)
}

/// Elementwise sum of all score rows.
pub(crate) fn vote_sum(signals: &[SignalScore], len: usize) -> Array1<f64> {
    signals
        .iter()
        .fold(Array1::zeros(len), |acc, s| acc + &s.scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_score_from_signals() {
        let score = SignalScore::from_signals("test", &[Signal::Buy, Signal::Hold, Signal::Sell]);

        assert_eq!(score.name, "test");
        assert_eq!(score.scores.to_vec(), vec![1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_validate_rejects_empty_and_ragged() {
        assert!(validate(&[]).is_err());

        let ragged = vec![
            SignalScore::from_signals("a", &[Signal::Buy, Signal::Buy]),
            SignalScore::from_signals("b", &[Signal::Buy]),
        ];
        let err = validate(&ragged).unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }
}
