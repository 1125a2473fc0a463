//! Moving-average crossover: long while the fast SMA is above the slow one.

use ronda_traits::{MarketData, Result, RondaError, Signal, SignalSeries, Strategy};
use serde::{Deserialize, Serialize};

use super::per_row;

/// Configuration for the SMA crossover strategy.
///
/// Reads the columns `sma_{fast}` and `sma_{slow}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmaCrossoverConfig {
    /// Fast moving-average window (default: 20)
    pub fast: usize,
    /// Slow moving-average window (default: 50)
    pub slow: usize,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self { fast: 20, slow: 50 }
    }
}

/// Buys while `sma_{fast} > sma_{slow}`, sells while it is below.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    config: SmaCrossoverConfig,
    columns: [String; 2],
}

impl SmaCrossover {
    /// Create a new SMA crossover strategy.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Configuration`] unless `fast < slow`.
    pub fn new(config: SmaCrossoverConfig) -> Result<Self> {
        if config.fast >= config.slow {
            return Err(RondaError::Configuration(format!(
                "SMA crossover needs fast < slow, got fast={} slow={}",
                config.fast, config.slow
            )));
        }
        let columns = [format!("sma_{}", config.fast), format!("sma_{}", config.slow)];
        Ok(Self { config, columns })
    }

    /// The strategy configuration.
    #[must_use]
    pub const fn config(&self) -> &SmaCrossoverConfig {
        &self.config
    }
}

impl Default for SmaCrossover {
    fn default() -> Self {
        let config = SmaCrossoverConfig::default();
        let columns = [format!("sma_{}", config.fast), format!("sma_{}", config.slow)];
        Self { config, columns }
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn generate(&self, data: &MarketData) -> Result<SignalSeries> {
        per_row(self, data, |row| {
            let (fast, slow) = (row[0], row[1]);
            if fast > slow {
                Signal::Buy
            } else if fast < slow {
                Signal::Sell
            } else {
                Signal::Hold
            }
        })
    }

    fn required_columns(&self) -> Vec<String> {
        self.columns.to_vec()
    }
}
