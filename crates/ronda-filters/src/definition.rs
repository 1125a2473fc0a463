//! Declarative filter definitions, as written in registry configuration.

use ronda_traits::Result;
use serde::{Deserialize, Serialize};

use crate::{
    CompositeFilter, EligibilityFilter, LiquidityFilter, LiquidityFilterConfig, StockFilter,
    StockFilterConfig, TimeFilter, TimeFilterConfig, VolatilityRegimeConfig,
    VolatilityRegimeFilter,
};

fn default_logic() -> String {
    "AND".to_string()
}

/// A filter as declared in configuration, tagged by `type`.
///
/// ```yaml
/// type: composite
/// logic: AND
/// filters:
///   - type: stock
///     min_price: 5.0
///   - type: liquidity
///     min_avg_volume: 1000000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterDefinition {
    /// Price, volume, size and volatility bounds.
    Stock(StockFilterConfig),
    /// Calendar and time-of-day rules.
    Time(TimeFilterConfig),
    /// Rolling volume, spread and dollar volume.
    Liquidity(LiquidityFilterConfig),
    /// ATR above its trailing mean.
    VolatilityRegime(VolatilityRegimeConfig),
    /// AND/OR over nested definitions.
    Composite {
        /// `AND` or `OR`, case-insensitive.
        #[serde(default = "default_logic")]
        logic: String,
        /// Child definitions, in evaluation order.
        #[serde(default)]
        filters: Vec<FilterDefinition>,
    },
}

impl FilterDefinition {
    /// Constructs the filter, validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ronda_traits::RondaError::FilterConfiguration`] for invalid
    /// settings, an unknown logic mode or an empty composite.
    pub fn build(&self) -> Result<Box<dyn EligibilityFilter>> {
        Ok(match self {
            Self::Stock(config) => Box::new(StockFilter::new(config.clone())),
            Self::Time(config) => Box::new(TimeFilter::new(config.clone())?),
            Self::Liquidity(config) => Box::new(LiquidityFilter::new(config.clone())?),
            Self::VolatilityRegime(config) => {
                Box::new(VolatilityRegimeFilter::new(config.clone())?)
            }
            Self::Composite { logic, filters } => {
                let children = filters
                    .iter()
                    .map(Self::build)
                    .collect::<Result<Vec<_>>>()?;
                Box::new(CompositeFilter::from_logic_str(children, logic)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_traits::RondaError;

    #[test]
    fn test_nested_definition_from_yaml() {
        let yaml = r"
type: composite
logic: and
filters:
  - type: stock
    min_price: 5.0
  - type: volatility_regime
    window: 10
";
        let definition: FilterDefinition = serde_yaml::from_str(yaml).unwrap();
        let filter = definition.build().unwrap();
        assert_eq!(filter.name(), "composite");
        assert_eq!(filter.describe()["filters"][1]["config"]["window"], 10);
        assert_eq!(filter.describe()["filters"][1]["config"]["atr_column"], "atr_14");
    }

    #[test]
    fn test_empty_composite_fails_to_build() {
        let definition: FilterDefinition = serde_yaml::from_str("type: composite\n").unwrap();
        assert!(matches!(
            definition.build(),
            Err(RondaError::FilterConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_logic_fails_to_build() {
        let definition = FilterDefinition::Composite {
            logic: "NAND".to_string(),
            filters: vec![FilterDefinition::Stock(StockFilterConfig::default())],
        };
        assert!(definition.build().is_err());
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let result: std::result::Result<FilterDefinition, _> =
            serde_yaml::from_str("type: sentiment\n");
        assert!(result.is_err());
    }
}
