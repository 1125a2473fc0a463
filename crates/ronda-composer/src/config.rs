//! Registry configuration: strategies, filters, combinations and settings.
//!
//! The registry is a YAML document read once when a composer is built:
//!
//! ```yaml
//! strategies:
//!   trend:
//!     class: SMACrossover
//!     parameters: { fast: 20, slow: 50 }
//!   reversion:
//!     class: RSIReversion
//!     filter: liquid
//! filters:
//!   liquid:
//!     type: liquidity
//!     min_avg_volume: 1000000
//! combinations:
//!   consensus:
//!     strategies: [trend, reversion]
//!     method: unanimous
//! settings:
//!   signal_threshold: 0.0
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ronda_combine::CombinationMethod;
use ronda_filters::FilterDefinition;
use ronda_traits::{DIRECTIONAL_ROLE, Result, RondaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registry file read by [`crate::get_signals`] and the CLI when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/strategies.yaml";

const fn default_true() -> bool {
    true
}

fn default_role() -> String {
    DIRECTIONAL_ROLE.to_string()
}

/// A configured strategy instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyDefinition {
    /// Strategy class, e.g. `SMACrossover`.
    pub class: String,
    /// Class-specific parameters; omitted parameters take their defaults.
    #[serde(default)]
    pub parameters: Value,
    /// Disabled strategies are not listed and cannot be executed.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Role stamped into outputs.
    #[serde(default = "default_role")]
    pub role: String,
    /// Context keys that must be present before the strategy runs.
    ///
    /// Unset means the dataset the strategy reads: `data_key`, or
    /// `price_data` when that is unset too.
    #[serde(default)]
    pub required_keys: Option<Vec<String>>,
    /// Context dataset the strategy reads; defaults to `price_data`.
    #[serde(default)]
    pub data_key: Option<String>,
    /// Produce an empty output instead of failing when the dataset is absent.
    #[serde(default)]
    pub allow_empty_input: bool,
    /// Named filter gating this strategy's own signals before merging.
    #[serde(default)]
    pub filter: Option<String>,
}

/// What a combination does when one of its strategies fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole combination.
    #[default]
    Abort,
    /// Leave the strategy out, record the failure in the report and continue.
    Skip,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// A named combination of strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombinationDefinition {
    /// Strategy names, in declared order.
    pub strategies: Vec<String>,
    /// Merge method.
    #[serde(default)]
    pub method: CombinationMethod,
    /// Per-strategy weights for `weighted_average`; missing entries weigh 1.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    /// Named filters gating the merged signal; all must pass.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Hold band for `weighted_average`; overrides `settings.signal_threshold`.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Failure policy for the listed strategies.
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Free-form description shown by introspection.
    #[serde(default)]
    pub description: Option<String>,
}

/// Registry-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default hold band for `weighted_average` combinations.
    pub signal_threshold: f64,
    /// Invoke the strategies of a combination in parallel.
    pub parallel: bool,
}

/// The complete registry document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Strategy definitions by name.
    pub strategies: BTreeMap<String, StrategyDefinition>,
    /// Filter definitions by name.
    pub filters: BTreeMap<String, FilterDefinition>,
    /// Combination definitions by name.
    pub combinations: BTreeMap<String, CombinationDefinition>,
    /// Registry-wide settings.
    pub settings: Settings,
}

impl RegistryConfig {
    /// Parses a registry from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| RondaError::Configuration(format!("Invalid YAML configuration: {e}")))
    }

    /// Reads and parses a registry file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RondaError::Configuration(format!(
                "Cannot read configuration file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Threshold a `weighted_average` combination uses.
    #[must_use]
    pub fn threshold_for(&self, combination: &CombinationDefinition) -> f64 {
        combination
            .threshold
            .unwrap_or(self.settings.signal_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r"
strategies:
  trend:
    class: SMACrossover
    parameters:
      fast: 10
      slow: 30
  reversion:
    class: RSIReversion
    enabled: false
filters:
  liquid:
    type: liquidity
    min_avg_volume: 1000000
combinations:
  blend:
    strategies: [trend, reversion]
    method: weighted_average
    weights: { trend: 2.0 }
    threshold: 0.25
    on_failure: skip
  default_method:
    strategies: [trend]
settings:
  signal_threshold: 0.1
";

    #[test]
    fn test_parse_registry() {
        let config = RegistryConfig::from_yaml_str(YAML).unwrap();

        let trend = &config.strategies["trend"];
        assert!(trend.enabled);
        assert_eq!(trend.role, DIRECTIONAL_ROLE);
        assert_eq!(trend.required_keys, None);
        assert_eq!(trend.parameters["fast"], 10);
        assert!(!config.strategies["reversion"].enabled);

        let blend = &config.combinations["blend"];
        assert_eq!(blend.method, CombinationMethod::WeightedAverage);
        assert_eq!(blend.on_failure, FailurePolicy::Skip);
        assert_eq!(config.threshold_for(blend), 0.25);

        let plain = &config.combinations["default_method"];
        assert_eq!(plain.method, CombinationMethod::MajorityVote);
        assert_eq!(plain.on_failure, FailurePolicy::Abort);
        assert_eq!(config.threshold_for(plain), 0.1);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let yaml = "combinations:\n  x:\n    strategies: [a]\n    method: loudest\n";
        let err = RegistryConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, RondaError::Configuration(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let yaml = "strategies:\n  a:\n    class: RSIReversion\n    enabeld: false\n";
        assert!(RegistryConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = RegistryConfig::from_path("/nonexistent/strategies.yaml").unwrap_err();
        assert!(err.to_string().contains("Cannot read configuration file"));
    }

    #[test]
    fn test_empty_document_is_empty_registry() {
        let config = RegistryConfig::from_yaml_str("{}").unwrap();
        assert!(config.strategies.is_empty());
        assert!(!config.settings.parallel);
    }
}
