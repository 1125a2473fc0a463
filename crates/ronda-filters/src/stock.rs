//! Stock eligibility by price, volume, market cap and volatility bounds.

use polars::prelude::BooleanChunked;
use ronda_traits::{MarketData, Result};
use serde::{Deserialize, Serialize};

use crate::filter::{EligibilityFilter, mask_from, optional_column, restrict};

/// Configuration for [`StockFilter`].
///
/// Every bound is optional: an unset bound is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockFilterConfig {
    /// Minimum daily volume (`volume` column).
    pub min_volume: Option<f64>,
    /// Minimum price (`close` column).
    pub min_price: Option<f64>,
    /// Maximum price (`close` column).
    pub max_price: Option<f64>,
    /// Minimum market capitalization (`market_cap` column).
    pub min_market_cap: Option<f64>,
    /// Maximum volatility (`atr_14`, or `volatility` when ATR is absent).
    pub max_volatility: Option<f64>,
    /// Symbols that are never eligible.
    pub exclude_symbols: Vec<String>,
    /// When non-empty, only these symbols are eligible.
    pub include_symbols: Vec<String>,
}

/// Filters rows by per-row price, volume, size and volatility bounds.
///
/// Rows with a missing value in a bounded column are ineligible. Symbol lists
/// only apply to datasets with a `symbol` column.
#[derive(Debug, Clone)]
pub struct StockFilter {
    config: StockFilterConfig,
}

impl StockFilter {
    /// Create a new stock filter with the given configuration.
    #[must_use]
    pub const fn new(config: StockFilterConfig) -> Self {
        Self { config }
    }

    /// The filter configuration.
    #[must_use]
    pub const fn config(&self) -> &StockFilterConfig {
        &self.config
    }

    fn volatility_column(data: &MarketData) -> &'static str {
        if data.has_column("atr_14") {
            "atr_14"
        } else {
            "volatility"
        }
    }
}

impl Default for StockFilter {
    fn default() -> Self {
        Self::new(StockFilterConfig::default())
    }
}

impl EligibilityFilter for StockFilter {
    fn name(&self) -> &str {
        "stock"
    }

    fn apply(&self, data: &MarketData) -> Result<BooleanChunked> {
        let cfg = &self.config;
        let mut mask = vec![true; data.len()];

        let bounds: [(&str, Option<f64>, fn(f64, f64) -> bool); 5] = [
            ("volume", cfg.min_volume, |v, b| v >= b),
            ("close", cfg.min_price, |v, b| v >= b),
            ("close", cfg.max_price, |v, b| v <= b),
            ("market_cap", cfg.min_market_cap, |v, b| v >= b),
            (Self::volatility_column(data), cfg.max_volatility, |v, b| v <= b),
        ];

        for (column, bound, keep) in bounds {
            let Some(bound) = bound else { continue };
            if let Some(values) = optional_column(data, self.name(), column)? {
                restrict(&mut mask, &values, |v| keep(v, bound));
            }
        }

        if !cfg.exclude_symbols.is_empty() || !cfg.include_symbols.is_empty() {
            if let Some(symbols) = data.symbols()? {
                for (slot, symbol) in mask.iter_mut().zip(symbols) {
                    let symbol = symbol.unwrap_or_default();
                    let excluded = cfg.exclude_symbols.contains(&symbol);
                    let included =
                        cfg.include_symbols.is_empty() || cfg.include_symbols.contains(&symbol);
                    *slot = *slot && !excluded && included;
                }
            } else {
                tracing::warn!(
                    filter = self.name(),
                    "symbol lists set but dataset has no symbol column"
                );
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
    use polars::prelude::*;
    use ronda_traits::Timestamp;

    fn day(d: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 2, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn data() -> MarketData {
        MarketData::from_columns(
            &[day(1), day(2), day(5), day(6)],
            vec![
                ("close", vec![4.0, 10.0, 250.0, 12.0]),
                ("volume", vec![2e6, 2e6, 3e6, 5e5]),
                ("atr_14", vec![0.1, 0.2, 9.0, f64::NAN]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_unset_bounds_admit_everything() {
        let mask = StockFilter::default().apply(&data()).unwrap();
        assert_eq!(mask_values(&mask), vec![true; 4]);
    }

    #[test]
    fn test_price_and_volume_bounds() {
        let filter = StockFilter::new(StockFilterConfig {
            min_price: Some(5.0),
            max_price: Some(200.0),
            min_volume: Some(1e6),
            ..Default::default()
        });
        let mask = filter.apply(&data()).unwrap();
        assert_eq!(mask_values(&mask), vec![false, true, false, false]);
    }

    #[test]
    fn test_volatility_uses_atr_and_rejects_missing() {
        let filter = StockFilter::new(StockFilterConfig {
            max_volatility: Some(1.0),
            ..Default::default()
        });
        let mask = filter.apply(&data()).unwrap();
        assert_eq!(mask_values(&mask), vec![true, true, false, false]);
    }

    #[test]
    fn test_bound_on_absent_column_is_skipped() {
        let filter = StockFilter::new(StockFilterConfig {
            min_market_cap: Some(1e9),
            ..Default::default()
        });
        let mask = filter.apply(&data()).unwrap();
        assert_eq!(mask_values(&mask), vec![true; 4]);
    }

    #[test]
    fn test_symbol_lists() {
        let symbols = Series::new("symbol".into(), &["AAPL", "MSFT", "TSLA", "AAPL"]);
        let mut frame = data().into_inner();
        frame.with_column(symbols).unwrap();
        let data = MarketData::new(frame);

        let filter = StockFilter::new(StockFilterConfig {
            include_symbols: vec!["AAPL".to_string(), "TSLA".to_string()],
            exclude_symbols: vec!["TSLA".to_string()],
            ..Default::default()
        });
        let mask = filter.apply(&data).unwrap();
        assert_eq!(mask_values(&mask), vec![true, false, false, true]);
    }

    #[test]
    fn test_filter_does_not_touch_input() {
        let input = data();
        let before = input.data().clone();
        let filter = StockFilter::new(StockFilterConfig {
            min_price: Some(5.0),
            ..Default::default()
        });
        let first = mask_values(&filter.apply(&input).unwrap());
        let second = mask_values(&filter.apply(&input).unwrap());

        assert_eq!(first, second);
        assert!(input.data().equals_missing(&before));
    }

    #[test]
    fn test_config_from_yaml() {
        let config: StockFilterConfig =
            serde_yaml::from_str("min_price: 5.0\nexclude_symbols: [GME]\n").unwrap();
        assert_eq!(config.min_price, Some(5.0));
        assert_eq!(config.max_price, None);
        assert_eq!(config.exclude_symbols, vec!["GME".to_string()]);
    }
}
