//! Liquidity eligibility by rolling volume, spread and dollar volume.

use polars::prelude::BooleanChunked;
use ronda_traits::{MarketData, Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::filter::{EligibilityFilter, mask_from, optional_column, restrict, rolling_mean, row_groups};

const fn default_volume_window() -> usize {
    20
}

/// Configuration for [`LiquidityFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityFilterConfig {
    /// Minimum trailing average volume.
    pub min_avg_volume: Option<f64>,
    /// Trailing window (rows) of the average volume.
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,
    /// Maximum relative spread `(ask - bid) / close`.
    pub max_bid_ask_spread: Option<f64>,
    /// Minimum `close * volume`.
    pub min_dollar_volume: Option<f64>,
}

impl Default for LiquidityFilterConfig {
    fn default() -> Self {
        Self {
            min_avg_volume: None,
            volume_window: default_volume_window(),
            max_bid_ask_spread: None,
            min_dollar_volume: None,
        }
    }
}

/// Filters rows by trading liquidity.
///
/// The average volume is a trailing mean over up to `volume_window` rows of
/// the same instrument, so the first rows of a series average over what is
/// available.
#[derive(Debug, Clone)]
pub struct LiquidityFilter {
    config: LiquidityFilterConfig,
}

impl LiquidityFilter {
    /// Create a liquidity filter.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::FilterConfiguration`] when `volume_window` is zero.
    pub fn new(config: LiquidityFilterConfig) -> Result<Self> {
        if config.volume_window == 0 {
            return Err(RondaError::FilterConfiguration(
                "volume_window must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// The filter configuration.
    #[must_use]
    pub const fn config(&self) -> &LiquidityFilterConfig {
        &self.config
    }

    fn average_volume(&self, data: &MarketData, volume: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
        let mut averages = vec![None; data.len()];
        for rows in row_groups(data)? {
            let means = rolling_mean(volume, &rows, self.config.volume_window, 1);
            for (row, mean) in rows.into_iter().zip(means) {
                averages[row] = mean;
            }
        }
        Ok(averages)
    }
}

impl EligibilityFilter for LiquidityFilter {
    fn name(&self) -> &str {
        "liquidity"
    }

    fn apply(&self, data: &MarketData) -> Result<BooleanChunked> {
        let cfg = &self.config;
        let mut mask = vec![true; data.len()];

        if let Some(min_avg) = cfg.min_avg_volume
            && let Some(volume) = optional_column(data, self.name(), "volume")?
        {
            let averages = self.average_volume(data, &volume)?;
            restrict(&mut mask, &averages, |v| v >= min_avg);
        }

        if let Some(min_dollar) = cfg.min_dollar_volume
            && let Some(volume) = optional_column(data, self.name(), "volume")?
            && let Some(close) = optional_column(data, self.name(), "close")?
        {
            let dollar: Vec<Option<f64>> = volume
                .iter()
                .zip(&close)
                .map(|(v, c)| Some((*v)? * (*c)?))
                .collect();
            restrict(&mut mask, &dollar, |v| v >= min_dollar);
        }

        if let Some(max_spread) = cfg.max_bid_ask_spread
            && let Some(bid) = optional_column(data, self.name(), "bid")?
            && let Some(ask) = optional_column(data, self.name(), "ask")?
            && let Some(close) = optional_column(data, self.name(), "close")?
        {
            let spread: Vec<Option<f64>> = bid
                .iter()
                .zip(&ask)
                .zip(&close)
                .map(|((b, a), c)| Some(((*a)? - (*b)?) / (*c)?))
                .collect();
            restrict(&mut mask, &spread, |v| v.is_finite() && v <= max_spread);
        }

        Ok(mask_from(&mask))
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "filter_type": self.name(), "config": self.config })
    }
}
