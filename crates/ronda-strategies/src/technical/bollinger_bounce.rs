//! Bollinger band bounce: fade closes outside the bands.

use ronda_traits::{MarketData, Result, Signal, SignalSeries, Strategy};
use serde::{Deserialize, Serialize};

use super::per_row;

/// Configuration for the Bollinger bounce strategy.
///
/// Reads `close`, `bb_lower_{window}` and `bb_upper_{window}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BollingerBounceConfig {
    /// Band window (default: 20)
    #[serde(alias = "bb_window")]
    pub window: usize,
}

impl Default for BollingerBounceConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// Buys when the close is below the lower band, sells when above the upper.
#[derive(Debug, Clone)]
pub struct BollingerBounce {
    config: BollingerBounceConfig,
}

impl BollingerBounce {
    /// Create a new Bollinger bounce strategy.
    #[must_use]
    pub const fn new(config: BollingerBounceConfig) -> Self {
        Self { config }
    }

    /// Get the band window.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.config.window
    }
}

impl Default for BollingerBounce {
    fn default() -> Self {
        Self::new(BollingerBounceConfig::default())
    }
}

impl Strategy for BollingerBounce {
    fn name(&self) -> &str {
        "bollinger_bounce"
    }

    fn generate(&self, data: &MarketData) -> Result<SignalSeries> {
        per_row(self, data, |row| {
            let (close, lower, upper) = (row[0], row[1], row[2]);
            if close < lower {
                Signal::Buy
            } else if close > upper {
                Signal::Sell
            } else {
                Signal::Hold
            }
        })
    }

    fn required_columns(&self) -> Vec<String> {
        vec![
            "close".to_string(),
            format!("bb_lower_{}", self.config.window),
            format!("bb_upper_{}", self.config.window),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technical::fixtures::{frame, values};

    #[test]
    fn test_band_breaks() {
        let data = frame(vec![
            ("close", vec![10.0, 7.0, 15.0, 8.0, 14.0]),
            ("bb_lower_20", vec![8.0; 5]),
            ("bb_upper_20", vec![14.0; 5]),
        ]);
        let series = BollingerBounce::default().generate(&data).unwrap();
        assert_eq!(values(&series), vec![0, 1, -1, 0, 0]);
    }

    #[test]
    fn test_window_selects_columns() {
        let strategy = BollingerBounce::new(BollingerBounceConfig { window: 10 });
        assert_eq!(strategy.window(), 10);
        assert!(strategy.required_columns().contains(&"bb_upper_10".to_string()));
    }
}
