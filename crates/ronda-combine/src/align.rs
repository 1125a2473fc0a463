//! Outer alignment of per-strategy signal series on a shared time index.

use std::collections::BTreeSet;

use ndarray::Array1;
use ronda_traits::{Signal, SignalSeries, Timestamp};

use crate::combiner::SignalScore;

/// Score rows of several strategies on the union of their timestamps.
#[derive(Debug, Clone, Default)]
pub struct AlignedSignals {
    /// Union of all input timestamps, ascending.
    pub index: Vec<Timestamp>,
    /// One row per input series, in input order.
    pub scores: Vec<SignalScore>,
}

impl AlignedSignals {
    /// Outer-aligns `series` on the union of their indices.
    ///
    /// A strategy with no value at a timestamp contributes 0 there; no
    /// timestamp is dropped.
    pub fn outer<'a>(series: impl IntoIterator<Item = (&'a str, &'a SignalSeries)>) -> Self {
        let series: Vec<(&str, &SignalSeries)> = series.into_iter().collect();
        let index: Vec<Timestamp> = series
            .iter()
            .flat_map(|(_, s)| s.index().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let scores = series
            .iter()
            .map(|(name, s)| SignalScore {
                name: (*name).to_string(),
                scores: index
                    .iter()
                    .map(|ts| s.get(ts).map_or(0.0, f64::from))
                    .collect(),
            })
            .collect();

        Self { index, scores }
    }

    /// Whether there are no timestamps to combine.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Pairs a combined decision vector with the shared index.
    ///
    /// Values are mapped by sign, so anything that is not strictly positive
    /// or negative holds.
    #[must_use]
    pub fn to_series(&self, combined: &Array1<f64>) -> SignalSeries {
        self.index
            .iter()
            .copied()
            .zip(combined.iter().map(|&v| Signal::from_sign(v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_outer_alignment_fills_missing_with_zero() {
        let a = SignalSeries::from_parts(&[day(3), day(4)], &[Signal::Buy, Signal::Sell]).unwrap();
        let b = SignalSeries::from_parts(&[day(4), day(5)], &[Signal::Buy, Signal::Buy]).unwrap();

        let aligned = AlignedSignals::outer([("a", &a), ("b", &b)]);

        assert_eq!(aligned.index, vec![day(3), day(4), day(5)]);
        assert_eq!(aligned.scores[0].name, "a");
        assert_eq!(aligned.scores[0].scores.to_vec(), vec![1.0, -1.0, 0.0]);
        assert_eq!(aligned.scores[1].scores.to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_no_series_is_empty() {
        let aligned = AlignedSignals::outer(std::iter::empty());
        assert!(aligned.is_empty());
        assert!(aligned.scores.is_empty());
    }

    #[test]
    fn test_to_series_maps_sign() {
        let a = SignalSeries::from_parts(&[day(3), day(4)], &[Signal::Buy, Signal::Sell]).unwrap();
        let aligned = AlignedSignals::outer([("a", &a)]);
        let series = aligned.to_series(&Array1::from_vec(vec![0.0, -2.0]));

        assert_eq!(series.get(&day(3)), Some(Signal::Hold));
        assert_eq!(series.get(&day(4)), Some(Signal::Sell));
    }
}
