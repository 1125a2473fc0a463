//! Named combination methods, as declared in configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ronda_traits::{Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::{
    Combiner, MajorityVoteCombiner, SingleCombiner, UnanimousCombiner, WeightedAverageCombiner,
    WeightedAverageConfig,
};

/// How a combination merges its strategies' signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMethod {
    /// Sign of the summed votes.
    #[default]
    MajorityVote,
    /// Sign of the normalized weighted vote beyond a threshold.
    WeightedAverage,
    /// Directional only on full agreement.
    #[serde(alias = "unanimous_vote")]
    Unanimous,
    /// Exactly one strategy, passed through.
    Single,
}

impl CombinationMethod {
    /// All supported methods.
    pub const ALL: [Self; 4] = [
        Self::MajorityVote,
        Self::WeightedAverage,
        Self::Unanimous,
        Self::Single,
    ];

    /// Configuration name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MajorityVote => "majority_vote",
            Self::WeightedAverage => "weighted_average",
            Self::Unanimous => "unanimous",
            Self::Single => "single",
        }
    }

    /// Whether strategies that produced no signals still vote, as 0.
    ///
    /// Weighted averages normalize over the strategies that produced output,
    /// so an empty strategy neither votes nor counts toward the weight total.
    #[must_use]
    pub const fn counts_abstentions(self) -> bool {
        !matches!(self, Self::WeightedAverage)
    }

    /// Builds the combiner implementing this method.
    ///
    /// `weights` and `threshold` are only used by
    /// [`CombinationMethod::WeightedAverage`].
    pub fn combiner(
        self,
        weights: &BTreeMap<String, f64>,
        threshold: f64,
    ) -> Result<Box<dyn Combiner>> {
        Ok(match self {
            Self::MajorityVote => Box::new(MajorityVoteCombiner),
            Self::Unanimous => Box::new(UnanimousCombiner),
            Self::Single => Box::new(SingleCombiner),
            Self::WeightedAverage => Box::new(WeightedAverageCombiner::new(WeightedAverageConfig {
                weights: weights.clone(),
                threshold,
            })?),
        })
    }
}

impl FromStr for CombinationMethod {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "majority_vote" => Ok(Self::MajorityVote),
            "weighted_average" => Ok(Self::WeightedAverage),
            "unanimous" | "unanimous_vote" => Ok(Self::Unanimous),
            "single" => Ok(Self::Single),
            other => Err(RondaError::Configuration(format!(
                "Unknown combination method '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CombinationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for method in CombinationMethod::ALL {
            assert_eq!(method.as_str().parse::<CombinationMethod>().unwrap(), method);
        }
        assert_eq!(
            "unanimous_vote".parse::<CombinationMethod>().unwrap(),
            CombinationMethod::Unanimous
        );
        assert!("average".parse::<CombinationMethod>().is_err());
    }

    #[test]
    fn test_combiner_names_match() {
        for method in CombinationMethod::ALL {
            let combiner = method.combiner(&BTreeMap::new(), 0.0).unwrap();
            assert_eq!(combiner.name(), method.as_str());
        }
    }

    #[test]
    fn test_weighted_validation_happens_at_build() {
        let weights = BTreeMap::from([("a".to_string(), f64::NAN)]);
        assert!(CombinationMethod::WeightedAverage.combiner(&weights, 0.0).is_err());
        assert!(CombinationMethod::MajorityVote.combiner(&weights, 0.0).is_ok());
    }

    #[test]
    fn test_default_is_majority_vote() {
        assert_eq!(CombinationMethod::default(), CombinationMethod::MajorityVote);
    }

    #[test]
    fn test_only_votes_count_abstentions() {
        assert!(CombinationMethod::MajorityVote.counts_abstentions());
        assert!(CombinationMethod::Unanimous.counts_abstentions());
        assert!(!CombinationMethod::WeightedAverage.counts_abstentions());
    }
}
