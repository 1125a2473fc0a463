//! Strategy class registry for discovering and building built-in strategies.
//!
//! Registry configuration refers to strategies by class name (for example
//! `SMACrossover`) plus a parameter map; [`build_strategy`] turns such a pair
//! into a ready strategy.

use std::sync::Arc;

use ronda_traits::{Result, RondaError, Strategy};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::technical::{
    BollingerBounce, BollingerBounceConfig, MacdCross, MacdCrossConfig, RsiReversion,
    RsiReversionConfig, SmaCrossover, SmaCrossoverConfig,
};

/// Strategy category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyCategory {
    /// Trend-following strategies
    Trend,
    /// Mean reversion strategies
    Reversion,
    /// Momentum oscillator strategies
    Momentum,
}

impl StrategyCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Trend => "Trend-following moving average signals",
            Self::Reversion => "Mean reversion and contrarian signals",
            Self::Momentum => "Momentum oscillator crossovers",
        }
    }
}

/// Metadata about a built-in strategy class.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    /// Class name used in registry configuration
    pub class: &'static str,

    /// Strategy name reported in outputs
    pub name: &'static str,

    /// Category classification
    pub category: StrategyCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Indicator columns read with default parameters
    pub required_columns: &'static [&'static str],
}

/// Get information about all built-in strategy classes.
#[must_use]
pub fn available_strategies() -> Vec<StrategyInfo> {
    vec![
        StrategyInfo {
            class: "SMACrossover",
            name: "sma_crossover",
            category: StrategyCategory::Trend,
            description: "Long while the fast SMA is above the slow SMA, short while below",
            required_columns: &["sma_20", "sma_50"],
        },
        StrategyInfo {
            class: "RSIReversion",
            name: "rsi_reversion",
            category: StrategyCategory::Reversion,
            description: "Buy when RSI is oversold, sell when overbought",
            required_columns: &["rsi_14"],
        },
        StrategyInfo {
            class: "MACDCross",
            name: "macd_cross",
            category: StrategyCategory::Momentum,
            description: "Trade on MACD crossing its signal line",
            required_columns: &["macd", "macd_signal"],
        },
        StrategyInfo {
            class: "BollingerBounce",
            name: "bollinger_bounce",
            category: StrategyCategory::Reversion,
            description: "Fade closes outside the Bollinger bands",
            required_columns: &["close", "bb_lower_20", "bb_upper_20"],
        },
    ]
}

/// Get all strategy classes in a specific category.
#[must_use]
pub fn strategies_by_category(category: StrategyCategory) -> Vec<StrategyInfo> {
    available_strategies()
        .into_iter()
        .filter(|info| info.category == category)
        .collect()
}

/// Get information about a strategy class, by class name or strategy name.
#[must_use]
pub fn get_strategy_info(class: &str) -> Option<StrategyInfo> {
    available_strategies()
        .into_iter()
        .find(|info| info.class == class || info.name == class)
}

fn parameters<T: DeserializeOwned + Default>(class: &str, params: &Value) -> Result<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone()).map_err(|e| {
        RondaError::Configuration(format!("Invalid parameters for strategy class '{class}': {e}"))
    })
}

/// Builds a built-in strategy from its class name and parameters.
///
/// `params` may be `null` (all defaults) or an object of overrides.
///
/// # Errors
///
/// Returns [`RondaError::Configuration`] for an unknown class, unknown or
/// ill-typed parameters, or parameters the strategy rejects.
pub fn build_strategy(class: &str, params: &Value) -> Result<Arc<dyn Strategy>> {
    let info = get_strategy_info(class)
        .ok_or_else(|| RondaError::Configuration(format!("Unknown strategy class: {class}")))?;

    Ok(match info.name {
        "sma_crossover" => Arc::new(SmaCrossover::new(parameters::<SmaCrossoverConfig>(
            class, params,
        )?)?),
        "rsi_reversion" => Arc::new(RsiReversion::new(parameters::<RsiReversionConfig>(
            class, params,
        )?)?),
        "macd_cross" => Arc::new(MacdCross::new(parameters::<MacdCrossConfig>(class, params)?)),
        "bollinger_bounce" => Arc::new(BollingerBounce::new(
            parameters::<BollingerBounceConfig>(class, params)?,
        )),
        other => {
            return Err(RondaError::Configuration(format!(
                "Strategy class '{other}' has no constructor"
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_available_strategies() {
        let strategies = available_strategies();
        assert_eq!(strategies.len(), 4);

        let categories: Vec<_> = strategies.iter().map(|s| s.category).collect();
        assert!(categories.contains(&StrategyCategory::Trend));
        assert!(categories.contains(&StrategyCategory::Reversion));
        assert!(categories.contains(&StrategyCategory::Momentum));
    }

    #[test]
    fn test_strategies_by_category() {
        assert_eq!(strategies_by_category(StrategyCategory::Reversion).len(), 2);
        assert_eq!(strategies_by_category(StrategyCategory::Trend).len(), 1);
    }

    #[test]
    fn test_get_strategy_info() {
        let info = get_strategy_info("MACDCross").unwrap();
        assert_eq!(info.name, "macd_cross");
        assert_eq!(get_strategy_info("macd_cross").unwrap().class, "MACDCross");
        assert!(get_strategy_info("SentimentLLMStrategy").is_none());
    }

    #[test]
    fn test_category_descriptions() {
        assert!(!StrategyCategory::Trend.description().is_empty());
        assert!(!StrategyCategory::Momentum.description().is_empty());
    }

    #[test]
    fn test_every_class_builds_with_defaults() {
        for info in available_strategies() {
            let strategy = build_strategy(info.class, &Value::Null).unwrap();
            assert_eq!(strategy.name(), info.name);
            assert_eq!(strategy.required_columns(), info.required_columns);
        }
    }

    #[test]
    fn test_build_with_parameters() {
        let strategy = build_strategy("SMACrossover", &json!({"fast": 10, "slow": 30})).unwrap();
        assert_eq!(strategy.required_columns(), vec!["sma_10", "sma_30"]);
    }

    #[test]
    fn test_build_errors() {
        assert!(build_strategy("Nope", &Value::Null).is_err());
        assert!(build_strategy("SMACrossover", &json!({"fast": "ten"})).is_err());
        assert!(build_strategy("SMACrossover", &json!({"speed": 3})).is_err());
        assert!(build_strategy("SMACrossover", &json!({"fast": 60})).is_err());
    }
}
