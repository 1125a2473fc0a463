//! Vote-based combination: majority, unanimity and single pass-through.

use ndarray::Array1;
use ronda_traits::{Result, RondaError, Signal};

use crate::combiner::{Combiner, SignalScore, validate, vote_sum};

/// Sign of the summed votes; a tie holds.
///
/// # Examples
///
/// ```rust,no_run
/// use ronda_combine::{Combiner, MajorityVoteCombiner, SignalScore};
/// use ndarray::Array1;
///
/// let signals = vec![
///     SignalScore { name: "a".to_string(), scores: Array1::from_vec(vec![1.0, 1.0]) },
///     SignalScore { name: "b".to_string(), scores: Array1::from_vec(vec![1.0, -1.0]) },
///     SignalScore { name: "c".to_string(), scores: Array1::from_vec(vec![-1.0, 0.0]) },
/// ];
/// let merged = MajorityVoteCombiner.combine(&signals).unwrap();
/// assert_eq!(merged.to_vec(), vec![1.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVoteCombiner;

impl Combiner for MajorityVoteCombiner {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let len = validate(signals)?;
        Ok(vote_sum(signals, len).mapv(|x| f64::from(Signal::from_sign(x))))
    }

    fn name(&self) -> &str {
        "majority_vote"
    }
}

/// Directional only where every strategy agrees on the direction.
///
/// A single hold or opposing vote at a timestamp makes the result hold.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnanimousCombiner;

impl Combiner for UnanimousCombiner {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let len = validate(signals)?;
        let agreed = signals.len() as f64;
        Ok(vote_sum(signals, len).mapv(|x| {
            if x == agreed {
                1.0
            } else if x == -agreed {
                -1.0
            } else {
                0.0
            }
        }))
    }

    fn name(&self) -> &str {
        "unanimous"
    }
}

/// Passes the one configured strategy through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCombiner;

impl Combiner for SingleCombiner {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        validate(signals)?;
        match signals {
            [only] => Ok(only.scores.mapv(|x| f64::from(Signal::from_sign(x)))),
            _ => Err(RondaError::InvalidData(format!(
                "single method expects exactly one signal, got {}",
                signals.len()
            ))),
        }
    }

    fn name(&self) -> &str {
        "single"
    }
}
