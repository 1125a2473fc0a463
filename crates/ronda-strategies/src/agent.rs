//! Adapter lifting a [`Strategy`] into the [`Agent`] execution contract.

use std::fmt;
use std::sync::Arc;

use ronda_traits::{
    Agent, AgentIdentity, Context, MarketData, Output, PRICE_DATA, Result, RondaError, Strategy,
};
use serde_json::json;

/// Picks the dataset a strategy runs on from the context.
pub type DataSelector = Arc<dyn Fn(&Context) -> Option<MarketData> + Send + Sync>;

/// Runs a [`Strategy`] on one dataset of the context.
///
/// By default the dataset is `price_data`, which then becomes a required
/// context key. With a custom selector no keys are required and the selector
/// decides what to read.
pub struct StrategyAgent {
    identity: AgentIdentity,
    strategy: Arc<dyn Strategy>,
    required_keys: Vec<String>,
    data_key: String,
    selector: Option<DataSelector>,
    allow_empty_input: bool,
}

impl fmt::Debug for StrategyAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyAgent")
            .field("identity", &self.identity)
            .field("strategy", &self.strategy.name())
            .field("required_keys", &self.required_keys)
            .field("data_key", &self.data_key)
            .field("selector", &self.selector.is_some())
            .field("allow_empty_input", &self.allow_empty_input)
            .finish()
    }
}

impl StrategyAgent {
    /// Wraps `strategy` under `identity`, reading `price_data`.
    pub fn new(identity: AgentIdentity, strategy: Arc<dyn Strategy>) -> Self {
        Self {
            identity,
            strategy,
            required_keys: vec![PRICE_DATA.to_string()],
            data_key: PRICE_DATA.to_string(),
            selector: None,
            allow_empty_input: false,
        }
    }

    /// Reads the dataset stored under `key` instead of `price_data`.
    #[must_use]
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        if self.selector.is_none() {
            self.required_keys = vec![self.data_key.clone()];
        }
        self
    }

    /// Overrides the context keys checked before running.
    #[must_use]
    pub fn with_required_keys(mut self, keys: Vec<String>) -> Self {
        self.required_keys = keys;
        self
    }

    /// Uses `selector` to pick the dataset; no context keys are required.
    #[must_use]
    pub fn with_selector(mut self, selector: DataSelector) -> Self {
        self.selector = Some(selector);
        self.required_keys.clear();
        self
    }

    /// Returns an empty output instead of failing when there is no input.
    #[must_use]
    pub const fn allow_empty_input(mut self, allow: bool) -> Self {
        self.allow_empty_input = allow;
        self
    }

    /// The wrapped strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    fn input(&self, context: &Context) -> Result<Option<MarketData>> {
        let frame = match &self.selector {
            Some(select) => select(context),
            None => context.get(&self.data_key).cloned(),
        };
        match frame {
            Some(frame) => Ok(Some(frame)),
            None if self.allow_empty_input => Ok(None),
            None => Err(RondaError::InvalidData(format!(
                "Agent '{}' expected '{}' in context data",
                self.identity.name, self.data_key
            ))),
        }
    }
}

impl Agent for StrategyAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    fn run(&self, context: &Context) -> Result<Option<Output>> {
        let strategy_name = json!(self.strategy.name());
        let frame = match self.input(context)? {
            Some(frame) if !frame.is_empty() => frame,
            _ => {
                return Ok(Some(
                    Output::empty()
                        .with_rationale("No data available for strategy execution.")
                        .with_metadata("strategy", strategy_name),
                ));
            }
        };

        let signals = self.strategy.generate(&frame)?;
        tracing::debug!(
            agent = %self.identity.name,
            strategy = self.strategy.name(),
            rows = signals.len(),
            "strategy generated signals"
        );
        Ok(Some(Output::new(signals).with_metadata("strategy", strategy_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technical::{RsiReversion, fixtures::frame};
    use ronda_traits::{AGENT_NAME_KEY, DIRECTIONAL_ROLE, NEWS_DATA, Signal};

    fn agent() -> StrategyAgent {
        StrategyAgent::new(
            AgentIdentity::new("rsi", DIRECTIONAL_ROLE),
            Arc::new(RsiReversion::default()),
        )
    }

    #[test]
    fn test_requires_price_data_by_default() {
        let err = agent().invoke(&Context::new()).unwrap_err();
        match err {
            RondaError::MissingContext { keys, .. } => assert_eq!(keys, vec![PRICE_DATA]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_runs_strategy_on_price_data() {
        let context = Context::from_price_data(frame(vec![("rsi_14", vec![10.0, 90.0])])).unwrap();
        let output = agent().invoke(&context).unwrap();

        let series = output.signals().and_then(|p| p.as_series()).unwrap();
        assert_eq!(series.values().collect::<Vec<_>>(), vec![Signal::Buy, Signal::Sell]);
        assert_eq!(output.metadata()["strategy"], "rsi_reversion");
        assert_eq!(output.metadata()[AGENT_NAME_KEY], "rsi");
    }

    #[test]
    fn test_empty_frame_yields_empty_output() {
        let context = Context::from_price_data(frame(vec![("rsi_14", vec![])])).unwrap();
        let output = agent().invoke(&context).unwrap();
        assert!(output.is_empty());
        assert!(!output.rationale().is_empty());
    }

    #[test]
    fn test_custom_data_key() {
        let agent = agent().with_data_key(NEWS_DATA);
        assert_eq!(agent.required_keys(), [NEWS_DATA.to_string()]);

        let context = Context::new()
            .with_dataset(NEWS_DATA, frame(vec![("rsi_14", vec![50.0])]))
            .unwrap();
        assert!(!agent.invoke(&context).unwrap().is_empty());
    }

    #[test]
    fn test_selector_with_empty_input_allowed() {
        let agent = agent()
            .with_selector(Arc::new(|ctx: &Context| ctx.news_data().cloned()))
            .allow_empty_input(true);
        assert!(agent.required_keys().is_empty());

        let output = agent.invoke(&Context::new()).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_selector_without_input_fails() {
        let agent = agent().with_selector(Arc::new(|_: &Context| None));
        assert!(agent.invoke(&Context::new()).is_err());
    }
}
