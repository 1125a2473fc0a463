//! Weighted-average signal combination with a hold band.

use std::collections::BTreeMap;

use ndarray::Array1;
use ronda_traits::{Result, RondaError, Signal};
use serde::{Deserialize, Serialize};

use crate::combiner::{Combiner, SignalScore, validate};

/// Configuration for weighted-average combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedAverageConfig {
    /// Weight per strategy name; strategies without an entry weigh 1.0
    pub weights: BTreeMap<String, f64>,

    /// Half-width of the hold band around zero, in `[0, 1)`.
    /// A normalized score must lie strictly beyond it to trade.
    pub threshold: f64,
}

/// Combiner taking the sign of the normalized weighted vote.
///
/// Weights are normalized over the signals actually passed to
/// [`Combiner::combine`], so a strategy that produced nothing does not dilute
/// the others.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
/// use ronda_combine::{Combiner, SignalScore, WeightedAverageCombiner, WeightedAverageConfig};
/// use ndarray::Array1;
///
/// let config = WeightedAverageConfig {
///     weights: BTreeMap::from([("trend".to_string(), 3.0)]),
///     threshold: 0.0,
/// };
/// let combiner = WeightedAverageCombiner::new(config).unwrap();
///
/// let signals = vec![
///     SignalScore { name: "trend".to_string(), scores: Array1::from_vec(vec![1.0]) },
///     SignalScore { name: "reversion".to_string(), scores: Array1::from_vec(vec![-1.0]) },
/// ];
/// assert_eq!(combiner.combine(&signals).unwrap().to_vec(), vec![1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct WeightedAverageCombiner {
    config: WeightedAverageConfig,
}

impl WeightedAverageCombiner {
    /// Create a weighted-average combiner.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Configuration`] for a negative or non-finite
    /// weight, or a threshold outside `[0, 1)`.
    pub fn new(config: WeightedAverageConfig) -> Result<Self> {
        if let Some((name, w)) = config
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(RondaError::Configuration(format!(
                "Weight for '{name}' must be a non-negative number, got {w}"
            )));
        }
        if !(0.0..1.0).contains(&config.threshold) {
            return Err(RondaError::Configuration(format!(
                "Weighted-average threshold must be within [0, 1), got {}",
                config.threshold
            )));
        }
        Ok(Self { config })
    }

    /// The combiner configuration.
    #[must_use]
    pub const fn config(&self) -> &WeightedAverageConfig {
        &self.config
    }

    fn weight(&self, name: &str) -> f64 {
        self.config.weights.get(name).copied().unwrap_or(1.0)
    }

    /// Normalized weighted vote in `[-1, 1]` before thresholding.
    ///
    /// # Errors
    ///
    /// Fails when the signals are empty or ragged. When every weight is zero
    /// no strategy carries a vote and the score is all zeros.
    pub fn score(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let len = validate(signals)?;
        let total: f64 = signals.iter().map(|s| self.weight(&s.name)).sum();
        if total <= 0.0 {
            return Ok(Array1::zeros(len));
        }

        let weighted = signals.iter().fold(Array1::zeros(len), |acc, s| {
            acc + &(&s.scores * (self.weight(&s.name) / total))
        });
        Ok(weighted)
    }
}

impl Combiner for WeightedAverageCombiner {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let threshold = self.config.threshold;
        Ok(self
            .score(signals)?
            .mapv(|x| f64::from(Signal::from_threshold(x, threshold))))
    }

    fn name(&self) -> &str {
        "weighted_average"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::Signal::{Buy, Hold, Sell};

    fn combiner(weights: &[(&str, f64)], threshold: f64) -> WeightedAverageCombiner {
        WeightedAverageCombiner::new(WeightedAverageConfig {
            weights: weights.iter().map(|(n, w)| ((*n).to_string(), *w)).collect(),
            threshold,
        })
        .unwrap()
    }

    #[test]
    fn test_equal_weights_by_default() {
        let signals = vec![
            SignalScore::from_signals("a", &[Buy, Buy, Buy]),
            SignalScore::from_signals("b", &[Sell, Hold, Buy]),
        ];
        let c = combiner(&[], 0.0);

        let score = c.score(&signals).unwrap();
        assert_relative_eq!(score[0], 0.0);
        assert_relative_eq!(score[1], 0.5);
        assert_relative_eq!(score[2], 1.0);

        assert_eq!(c.combine(&signals).unwrap().to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_declared_weights_tip_the_balance() {
        let signals = vec![
            SignalScore::from_signals("trend", &[Buy]),
            SignalScore::from_signals("reversion", &[Sell]),
        ];
        let c = combiner(&[("trend", 1.0), ("reversion", 3.0)], 0.0);

        assert_relative_eq!(c.score(&signals).unwrap()[0], -0.5);
        assert_eq!(c.combine(&signals).unwrap().to_vec(), vec![-1.0]);
    }

    #[test]
    fn test_score_on_threshold_holds() {
        let signals = vec![
            SignalScore::from_signals("a", &[Buy]),
            SignalScore::from_signals("b", &[Hold]),
        ];
        // Normalized score is exactly 0.5.
        assert_eq!(combiner(&[], 0.5).combine(&signals).unwrap().to_vec(), vec![0.0]);
        assert_eq!(combiner(&[], 0.4).combine(&signals).unwrap().to_vec(), vec![1.0]);
    }

    #[test]
    fn test_weights_renormalize_over_present_signals() {
        let c = combiner(&[("a", 1.0), ("b", 1.0), ("absent", 10.0)], 0.0);
        let signals = vec![
            SignalScore::from_signals("a", &[Buy]),
            SignalScore::from_signals("b", &[Hold]),
        ];
        assert_relative_eq!(c.score(&signals).unwrap()[0], 0.5);
    }

    #[test]
    fn test_invalid_configuration() {
        let negative = WeightedAverageCombiner::new(WeightedAverageConfig {
            weights: BTreeMap::from([("a".to_string(), -1.0)]),
            threshold: 0.0,
        });
        assert!(negative.is_err());

        let threshold = WeightedAverageCombiner::new(WeightedAverageConfig {
            weights: BTreeMap::new(),
            threshold: 1.0,
        });
        assert!(threshold.is_err());
    }

    #[test]
    fn test_zero_weights_mute_every_signal() {
        let c = combiner(&[("a", 0.0), ("b", 0.0)], 0.0);
        let signals = vec![
            SignalScore::from_signals("a", &[Buy, Sell]),
            SignalScore::from_signals("b", &[Buy, Hold]),
        ];
        assert_eq!(c.combine(&signals).unwrap().to_vec(), vec![0.0, 0.0]);

        // A zero weight only mutes its own strategy.
        let c = combiner(&[("a", 0.0)], 0.0);
        assert_eq!(c.combine(&signals).unwrap().to_vec(), vec![1.0, 0.0]);
    }
}
