//! Technical strategies reading precomputed indicator columns.
//!
//! This module provides rule-based strategies over indicators that already
//! exist as columns on the dataset:
//! - SMA crossover: fast vs slow moving average
//! - RSI reversion: oversold / overbought thresholds
//! - MACD cross: MACD line crossing its signal line
//! - Bollinger bounce: close outside the bands
//!
//! Rows where any indicator the rule reads is missing hold.

mod bollinger_bounce;
mod macd_cross;
mod rsi_reversion;
mod sma_crossover;

pub use bollinger_bounce::{BollingerBounce, BollingerBounceConfig};
pub use macd_cross::{MacdCross, MacdCrossConfig};
pub use rsi_reversion::{RsiReversion, RsiReversionConfig};
pub use sma_crossover::{SmaCrossover, SmaCrossoverConfig};

use ronda_traits::{MarketData, Result, Signal, SignalSeries, Strategy};

/// Applies `rule` to the values of `strategy`'s required columns, row by row.
///
/// The index must be ascending and unique; a row with any missing value holds.
pub(crate) fn per_row(
    strategy: &dyn Strategy,
    data: &MarketData,
    rule: impl Fn(&[f64]) -> Signal,
) -> Result<SignalSeries> {
    strategy.validate_columns(data)?;
    let index = data.validate_index()?;
    let columns = strategy
        .required_columns()
        .iter()
        .map(|name| data.float_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut row = Vec::with_capacity(columns.len());
    let values: Vec<Signal> = (0..index.len())
        .map(|i| {
            row.clear();
            row.extend(columns.iter().map_while(|col| col[i]));
            if row.len() == columns.len() {
                rule(&row)
            } else {
                Signal::Hold
            }
        })
        .collect();

    SignalSeries::from_parts(&index, &values)
}
