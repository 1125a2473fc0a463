//! RSI mean reversion: buy oversold, sell overbought.

use ronda_traits::{MarketData, Result, RondaError, Signal, SignalSeries, Strategy};
use serde::{Deserialize, Serialize};

use super::per_row;

/// Configuration for the RSI reversion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiReversionConfig {
    /// RSI column (default: `rsi_14`)
    #[serde(alias = "rsi_col")]
    pub rsi_column: String,
    /// Buy below this level (default: 30)
    #[serde(alias = "low_thresh")]
    pub low_threshold: f64,
    /// Sell above this level (default: 70)
    #[serde(alias = "high_thresh")]
    pub high_threshold: f64,
}

impl Default for RsiReversionConfig {
    fn default() -> Self {
        Self {
            rsi_column: "rsi_14".to_string(),
            low_threshold: 30.0,
            high_threshold: 70.0,
        }
    }
}

/// Buys when RSI is strictly below the low threshold, sells when strictly
/// above the high threshold.
#[derive(Debug, Clone, Default)]
pub struct RsiReversion {
    config: RsiReversionConfig,
}

impl RsiReversion {
    /// Create a new RSI reversion strategy.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Configuration`] unless `low_threshold < high_threshold`.
    pub fn new(config: RsiReversionConfig) -> Result<Self> {
        if config.low_threshold >= config.high_threshold {
            return Err(RondaError::Configuration(format!(
                "RSI thresholds must satisfy low < high, got {} and {}",
                config.low_threshold, config.high_threshold
            )));
        }
        Ok(Self { config })
    }

    /// The strategy configuration.
    #[must_use]
    pub const fn config(&self) -> &RsiReversionConfig {
        &self.config
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "rsi_reversion"
    }

    fn generate(&self, data: &MarketData) -> Result<SignalSeries> {
        let (low, high) = (self.config.low_threshold, self.config.high_threshold);
        per_row(self, data, |row| {
            if row[0] < low {
                Signal::Buy
            } else if row[0] > high {
                Signal::Sell
            } else {
                Signal::Hold
            }
        })
    }

    fn required_columns(&self) -> Vec<String> {
        vec![self.config.rsi_column.clone()]
    }
}
