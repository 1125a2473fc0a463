//! Volatility regime eligibility: trade only while ATR is elevated.

use polars::prelude::BooleanChunked;
use ronda_traits::{MarketData, Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::filter::{EligibilityFilter, mask_from, rolling_mean, row_groups};

fn default_atr_column() -> String {
    "atr_14".to_string()
}

const fn default_window() -> usize {
    50
}

/// Configuration for [`VolatilityRegimeFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityRegimeConfig {
    /// Column holding the average true range.
    #[serde(default = "default_atr_column")]
    pub atr_column: String,
    /// Rows in the trailing mean the ATR is compared to.
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for VolatilityRegimeConfig {
    fn default() -> Self {
        Self {
            atr_column: default_atr_column(),
            window: default_window(),
        }
    }
}

/// Admits rows whose ATR is strictly above its trailing mean.
///
/// Rows before a full window of observations are ineligible. Unlike the bound
/// filters, the ATR column is mandatory.
#[derive(Debug, Clone)]
pub struct VolatilityRegimeFilter {
    config: VolatilityRegimeConfig,
}

impl VolatilityRegimeFilter {
    /// Create a volatility regime filter.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::FilterConfiguration`] when `window` is zero.
    pub fn new(config: VolatilityRegimeConfig) -> Result<Self> {
        if config.window == 0 {
            return Err(RondaError::FilterConfiguration(
                "volatility window must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }
}

impl EligibilityFilter for VolatilityRegimeFilter {
    fn name(&self) -> &str {
        "volatility_regime"
    }

    fn apply(&self, data: &MarketData) -> Result<BooleanChunked> {
        let atr = data.float_column(&self.config.atr_column)?;
        let mut mask = vec![false; data.len()];

        for rows in row_groups(data)? {
            let means = rolling_mean(&atr, &rows, self.config.window, self.config.window);
            for (row, mean) in rows.into_iter().zip(means) {
                mask[row] = matches!((atr[row], mean), (Some(v), Some(m)) if v > m);
            }
        }

        Ok(mask_from(&mask))
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "filter_type": self.name(), "config": self.config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::mask_values;
    use chrono::NaiveDate;
    use ronda_traits::Timestamp;

    fn data(atr: Vec<f64>) -> MarketData {
        let index: Vec<Timestamp> = (1..=atr.len() as u32)
            .map(|d| {
                NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            })
            .collect();
        MarketData::from_columns(&index, vec![("atr_14", atr)]).unwrap()
    }

    #[test]
    fn test_rising_atr_is_eligible_after_warmup() {
        let filter = VolatilityRegimeFilter::new(VolatilityRegimeConfig {
            window: 3,
            ..Default::default()
        })
        .unwrap();
        let mask = filter.apply(&data(vec![1.0, 2.0, 3.0, 4.0, 1.0])).unwrap();
        assert_eq!(mask_values(&mask), vec![false, false, true, true, false]);
    }

    #[test]
    fn test_missing_atr_column_is_an_error() {
        let filter = VolatilityRegimeFilter::new(VolatilityRegimeConfig {
            atr_column: "atr_20".to_string(),
            window: 2,
        })
        .unwrap();
        let err = filter.apply(&data(vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, RondaError::MissingColumn(_)));
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let result = VolatilityRegimeFilter::new(VolatilityRegimeConfig {
            window: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
