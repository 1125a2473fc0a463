//! Error types for the Ronda framework.
//!
//! Validation errors (missing context keys, unknown identifiers, malformed
//! filter configuration) are raised before any strategy logic runs. Errors
//! raised inside a strategy are carried through unchanged, annotated with the
//! identity of the strategy that produced them.

use thiserror::Error;

/// The main error type for Ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// A strategy's required context entries are absent.
    ///
    /// Every missing key is listed, not just the first one.
    #[error("Agent '{agent}' missing required context keys: {keys:?}")]
    MissingContext {
        /// Name of the agent that declared the keys.
        agent: String,
        /// All keys that were absent from the context.
        keys: Vec<String>,
    },

    /// A named combination is not present in the registry.
    #[error("Combination not found: {0}")]
    CombinationNotFound(String),

    /// A named strategy is not registered (or is disabled).
    #[error("Strategy not found: {0}")]
    StrategyNotFound(String),

    /// A named filter is not registered.
    #[error("Filter not found: {0}")]
    FilterNotFound(String),

    /// A filter could not be constructed from its configuration.
    #[error("Invalid filter configuration: {0}")]
    FilterConfiguration(String),

    /// A strategy failed inside its own logic.
    #[error("Strategy '{strategy}' ({role}) failed: {source}")]
    StrategyExecution {
        /// Name of the failing strategy.
        strategy: String,
        /// Role of the failing strategy.
        role: String,
        /// The error raised by the strategy.
        #[source]
        source: Box<RondaError>,
    },

    /// The registry configuration is malformed or inconsistent.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl RondaError {
    /// Wraps an error raised by a strategy with the strategy's identity.
    ///
    /// Missing-context errors already name the agent and are returned as-is.
    pub fn in_strategy(self, strategy: &str, role: &str) -> Self {
        match self {
            Self::MissingContext { .. } | Self::StrategyExecution { .. } => self,
            other => Self::StrategyExecution {
                strategy: strategy.to_string(),
                role: role.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Ronda operations.
///
/// This is a convenience type that uses [`RondaError`] as the error type.
pub type Result<T> = std::result::Result<T, RondaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RondaError::CombinationNotFound("nonexistent_combo".to_string());
        assert_eq!(err.to_string(), "Combination not found: nonexistent_combo");

        let err = RondaError::MissingColumn("close".to_string());
        assert_eq!(err.to_string(), "Missing required column: close");
    }

    #[test]
    fn test_missing_context_lists_every_key() {
        let err = RondaError::MissingContext {
            agent: "sma".to_string(),
            keys: vec!["price_data".to_string(), "news_data".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("price_data"));
        assert!(msg.contains("news_data"));
    }

    #[test]
    fn test_in_strategy_annotates_identity() {
        let err = RondaError::MissingColumn("rsi_14".to_string()).in_strategy("rsi", "directional");
        match err {
            RondaError::StrategyExecution {
                strategy,
                role,
                source,
            } => {
                assert_eq!(strategy, "rsi");
                assert_eq!(role, "directional");
                assert!(matches!(*source, RondaError::MissingColumn(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_in_strategy_keeps_missing_context() {
        let err = RondaError::MissingContext {
            agent: "sma".to_string(),
            keys: vec!["price_data".to_string()],
        }
        .in_strategy("sma", "directional");
        assert!(matches!(err, RondaError::MissingContext { .. }));
    }

    #[test]
    fn test_error_from_string() {
        let err: RondaError = "boom".into();
        assert!(matches!(err, RondaError::Other(_)));
    }
}
