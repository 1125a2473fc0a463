//! MACD crossover: trade on the bar where MACD crosses its signal line.

use ronda_traits::{MarketData, Result, Signal, SignalSeries, Strategy};
use serde::{Deserialize, Serialize};

/// Configuration for the MACD cross strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdCrossConfig {
    /// MACD line column (default: `macd`)
    #[serde(alias = "macd_col")]
    pub macd_column: String,
    /// Signal line column (default: `macd_signal`)
    #[serde(alias = "signal_col")]
    pub signal_column: String,
}

impl Default for MacdCrossConfig {
    fn default() -> Self {
        Self {
            macd_column: "macd".to_string(),
            signal_column: "macd_signal".to_string(),
        }
    }
}

/// Buys on a bullish cross (MACD moves from at-or-below to above the signal
/// line), sells on a bearish cross; holds otherwise.
///
/// The first row, and any row whose current or previous values are missing,
/// holds.
#[derive(Debug, Clone, Default)]
pub struct MacdCross {
    config: MacdCrossConfig,
}

impl MacdCross {
    /// Create a new MACD cross strategy.
    #[must_use]
    pub const fn new(config: MacdCrossConfig) -> Self {
        Self { config }
    }
}

impl Strategy for MacdCross {
    fn name(&self) -> &str {
        "macd_cross"
    }

    fn generate(&self, data: &MarketData) -> Result<SignalSeries> {
        self.validate_columns(data)?;
        let index = data.validate_index()?;
        let macd = data.float_column(&self.config.macd_column)?;
        let signal = data.float_column(&self.config.signal_column)?;

        // Spread of MACD over its signal line; `None` when either is missing.
        let spread: Vec<Option<f64>> = macd
            .iter()
            .zip(&signal)
            .map(|(m, s)| Some((*m)? - (*s)?))
            .collect();

        let values: Vec<Signal> = (0..index.len())
            .map(|i| match (i.checked_sub(1).and_then(|p| spread[p]), spread[i]) {
                (Some(prev), Some(curr)) if prev <= 0.0 && curr > 0.0 => Signal::Buy,
                (Some(prev), Some(curr)) if prev >= 0.0 && curr < 0.0 => Signal::Sell,
                _ => Signal::Hold,
            })
            .collect();

        SignalSeries::from_parts(&index, &values)
    }

    fn required_columns(&self) -> Vec<String> {
        vec![
            self.config.macd_column.clone(),
            self.config.signal_column.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technical::fixtures::{frame, values};

    #[test]
    fn test_crosses() {
        let data = frame(vec![
            ("macd", vec![0.0, 5.0, 10.0, 5.0, -5.0, -10.0, 0.0]),
            ("macd_signal", vec![5.0; 7]),
        ]);
        let series = MacdCross::default().generate(&data).unwrap();
        // Above from row 2; touches at row 3; below from row 4.
        assert_eq!(values(&series), vec![0, 0, 1, 0, -1, 0, 0]);
    }

    #[test]
    fn test_missing_previous_value_holds() {
        let data = frame(vec![
            ("macd", vec![f64::NAN, 6.0]),
            ("macd_signal", vec![5.0, 5.0]),
        ]);
        let series = MacdCross::default().generate(&data).unwrap();
        assert_eq!(values(&series), vec![0, 0]);
    }
}
