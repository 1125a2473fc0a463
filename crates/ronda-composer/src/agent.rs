//! A whole combination exposed as a single agent.

use std::sync::Arc;

use ronda_traits::{Agent, AgentIdentity, Context, Output, PRICE_DATA, Result};
use serde_json::json;

use crate::Composer;

/// Role of agents that aggregate several strategies.
pub const TECHNICAL_ROLE: &str = "technical";

/// Runs one named combination of a shared [`Composer`] as an [`Agent`].
///
/// The output carries the combined series; its metadata names the
/// combination, the method and the constituent strategies, plus any
/// strategies skipped under the `skip` failure policy.
#[derive(Debug, Clone)]
pub struct CompositeAgent {
    identity: AgentIdentity,
    composer: Arc<Composer>,
    combination: String,
    required_keys: Vec<String>,
}

impl CompositeAgent {
    /// Wraps `combination`; the agent is named after it.
    ///
    /// # Errors
    ///
    /// Returns [`ronda_traits::RondaError::CombinationNotFound`] when the
    /// composer has no such combination.
    pub fn new(composer: Arc<Composer>, combination: impl Into<String>) -> Result<Self> {
        let combination = combination.into();
        composer.get_combination_info(&combination)?;
        Ok(Self {
            identity: AgentIdentity::new(combination.clone(), TECHNICAL_ROLE),
            composer,
            combination,
            required_keys: vec![PRICE_DATA.to_string()],
        })
    }

    /// Uses `identity` instead of the default one.
    #[must_use]
    pub fn with_identity(mut self, identity: AgentIdentity) -> Self {
        self.identity = identity;
        self
    }
}

impl Agent for CompositeAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    fn run(&self, context: &Context) -> Result<Option<Output>> {
        let info = self.composer.get_combination_info(&self.combination)?;
        let execution = self.composer.execute_with_context(&self.combination, context)?;
        let skipped: Vec<&str> = execution.report.skipped().collect();

        let (sell, _, buy) = execution.signals.counts();
        let rationale = format!(
            "{} of {} strategies via {}: {buy} buy, {sell} sell",
            info.strategies.len() - skipped.len(),
            info.strategies.len(),
            info.method
        );
        let output = Output::new(execution.signals)
            .with_rationale(rationale)
            .with_metadata("combination", json!(self.combination))
            .with_metadata("method", json!(info.method))
            .with_metadata("strategies", json!(info.strategies))
            .with_metadata("skipped", json!(skipped))
            .with_metadata("zeroed_by_filter", json!(execution.report.zeroed_by_filter));
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ronda_traits::{AGENT_ROLE_KEY, MarketData, RondaError};

    const YAML: &str = r"
strategies:
  oversold:
    class: RSIReversion
  bands:
    class: BollingerBounce
combinations:
  reversion:
    strategies: [oversold, bands]
    method: majority_vote
";

    fn data() -> MarketData {
        let index: Vec<_> = (1..=3)
            .map(|d| {
                NaiveDate::from_ymd_opt(2024, 3, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            })
            .collect();
        MarketData::from_columns(
            &index,
            vec![
                ("rsi_14", vec![20.0, 50.0, 80.0]),
                ("close", vec![7.0, 10.0, 10.0]),
                ("bb_lower_20", vec![8.0; 3]),
                ("bb_upper_20", vec![14.0; 3]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_composite_agent_output() {
        let composer = Arc::new(Composer::from_yaml_str(YAML).unwrap());
        let agent = CompositeAgent::new(composer.clone(), "reversion").unwrap();
        let output = agent.invoke(&Context::from_price_data(data()).unwrap()).unwrap();

        let expected = composer.execute_combination("reversion", &data()).unwrap();
        assert_eq!(output.signals().and_then(|p| p.as_series()), Some(&expected));
        assert_eq!(output.metadata()["method"], "majority_vote");
        assert_eq!(output.metadata()["strategies"], json!(["oversold", "bands"]));
        assert_eq!(output.metadata()[AGENT_ROLE_KEY], TECHNICAL_ROLE);
    }

    #[test]
    fn test_unknown_combination_rejected() {
        let composer = Arc::new(Composer::from_yaml_str(YAML).unwrap());
        let err = CompositeAgent::new(composer, "momentum").unwrap_err();
        assert!(matches!(err, RondaError::CombinationNotFound(_)));
    }
}
