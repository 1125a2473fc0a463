//! Discrete trading signals and the time-indexed containers that carry them.
//!
//! A [`Signal`] is one of sell, hold or buy. Strategies emit a [`SignalSeries`]
//! for a single instrument or a [`SignalPanel`] with one series per
//! instrument; both are wrapped by [`SignalPayload`] in an agent's output.

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Result, RondaError, Symbol, Timestamp, types::TIMESTAMP_COLUMNS};

/// Name of the value column produced by [`SignalSeries::to_frame`].
pub const SIGNAL_COLUMN: &str = "signal";

/// Discrete trade direction at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    /// Sell or go short.
    Sell,
    /// Stay flat.
    #[default]
    Hold,
    /// Buy or go long.
    Buy,
}

impl Signal {
    /// Numeric value of the signal: -1, 0 or +1.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Sell => -1,
            Self::Hold => 0,
            Self::Buy => 1,
        }
    }

    /// Maps a real number to a signal by its sign.
    ///
    /// Zero, and anything that is not a finite number, maps to [`Signal::Hold`].
    #[must_use]
    pub fn from_sign(x: f64) -> Self {
        if !x.is_finite() {
            Self::Hold
        } else if x > 0.0 {
            Self::Buy
        } else if x < 0.0 {
            Self::Sell
        } else {
            Self::Hold
        }
    }

    /// Maps a real number to a signal with a dead band of `threshold`.
    ///
    /// Values exactly on the boundary hold.
    #[must_use]
    pub fn from_threshold(x: f64, threshold: f64) -> Self {
        if x > threshold {
            Self::Buy
        } else if x < -threshold {
            Self::Sell
        } else {
            Self::Hold
        }
    }

    /// Whether the signal asks for a position.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        !matches!(self, Self::Hold)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl From<Signal> for f64 {
    fn from(signal: Signal) -> Self {
        f64::from(signal.value())
    }
}

impl TryFrom<i8> for Signal {
    type Error = RondaError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            -1 => Ok(Self::Sell),
            0 => Ok(Self::Hold),
            1 => Ok(Self::Buy),
            other => Err(RondaError::InvalidData(format!(
                "Signal value must be -1, 0 or 1, got {other}"
            ))),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A time-indexed series of signals for one instrument.
///
/// Timestamps are kept sorted and unique, so iteration order is always
/// ascending in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSeries {
    points: BTreeMap<Timestamp, Signal>,
}

impl SignalSeries {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Builds a series from `index` and `values` of equal length.
    pub fn from_parts(index: &[Timestamp], values: &[Signal]) -> Result<Self> {
        if index.len() != values.len() {
            return Err(RondaError::InvalidData(format!(
                "Signal series has {} timestamps but {} values",
                index.len(),
                values.len()
            )));
        }
        Ok(index.iter().copied().zip(values.iter().copied()).collect())
    }

    /// Sets the signal at `ts`, replacing any previous value.
    pub fn insert(&mut self, ts: Timestamp, signal: Signal) {
        self.points.insert(ts, signal);
    }

    /// Signal at `ts`, if the series has a value there.
    #[must_use]
    pub fn get(&self, ts: &Timestamp) -> Option<Signal> {
        self.points.get(ts).copied()
    }

    /// Number of timestamps in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has zero rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamps in ascending order.
    pub fn index(&self) -> impl Iterator<Item = &Timestamp> + '_ {
        self.points.keys()
    }

    /// Signal values in timestamp order.
    pub fn values(&self) -> impl Iterator<Item = Signal> + '_ {
        self.points.values().copied()
    }

    /// `(timestamp, signal)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, Signal)> + '_ {
        self.points.iter().map(|(ts, s)| (ts, *s))
    }

    /// Counts of `(sell, hold, buy)` values.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        self.points
            .values()
            .fold((0, 0, 0), |(sell, hold, buy), s| match s {
                Signal::Sell => (sell + 1, hold, buy),
                Signal::Hold => (sell, hold + 1, buy),
                Signal::Buy => (sell, hold, buy + 1),
            })
    }

    /// Converts the series to a two-column DataFrame (`timestamp`, `signal`).
    pub fn to_frame(&self) -> Result<DataFrame> {
        let millis: Vec<i64> = self
            .points
            .keys()
            .map(|ts| ts.and_utc().timestamp_millis())
            .collect();
        let values: Vec<i32> = self.points.values().map(|s| i32::from(s.value())).collect();

        let index = Series::new(TIMESTAMP_COLUMNS[0].into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        let signal = Series::new(SIGNAL_COLUMN.into(), values);

        Ok(DataFrame::new(vec![Column::from(index), Column::from(signal)])?)
    }
}

impl FromIterator<(Timestamp, Signal)> for SignalSeries {
    fn from_iter<I: IntoIterator<Item = (Timestamp, Signal)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SignalSeries {
    type Item = (&'a Timestamp, &'a Signal);
    type IntoIter = std::collections::btree_map::Iter<'a, Timestamp, Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// One signal series per tradable instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPanel {
    series: BTreeMap<Symbol, SignalSeries>,
}

impl SignalPanel {
    /// Creates an empty panel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }

    /// Adds or replaces the series for `symbol`.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, series: SignalSeries) {
        self.series.insert(symbol.into(), series);
    }

    /// Series for `symbol`, if present.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SignalSeries> {
        self.series.get(symbol)
    }

    /// Instruments in the panel, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.series.keys()
    }

    /// Total number of rows across all instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.values().map(SignalSeries::len).sum()
    }

    /// Whether the panel carries zero rows.
    ///
    /// A panel listing instruments whose series are all empty is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(Symbol, SignalSeries)> for SignalPanel {
    fn from_iter<I: IntoIterator<Item = (Symbol, SignalSeries)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

/// Signal payload of a single strategy invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPayload {
    /// One series for a single instrument.
    Series(SignalSeries),
    /// One series per instrument.
    Panel(SignalPanel),
}

impl SignalPayload {
    /// Number of rows carried by the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Series(series) => series.len(),
            Self::Panel(panel) => panel.len(),
        }
    }

    /// Whether the payload has zero rows; identical for both shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single-instrument series, if this payload is one.
    #[must_use]
    pub const fn as_series(&self) -> Option<&SignalSeries> {
        match self {
            Self::Series(series) => Some(series),
            Self::Panel(_) => None,
        }
    }
}

impl From<SignalSeries> for SignalPayload {
    fn from(series: SignalSeries) -> Self {
        Self::Series(series)
    }
}

impl From<SignalPanel> for SignalPayload {
    fn from(panel: SignalPanel) -> Self {
        Self::Panel(panel)
    }
}
