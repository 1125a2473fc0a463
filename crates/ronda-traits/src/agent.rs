//! The uniform execution contract every strategy is invoked through.
//!
//! Any type implementing [`Agent`] can be registered with a composer and
//! invoked interchangeably. Callers use [`Agent::invoke`], which validates the
//! context, runs the agent and stamps the producer identity into the output.

use serde::{Deserialize, Serialize};

use crate::{Context, Output, Result, RondaError};

/// Default role of signal-producing agents.
pub const DIRECTIONAL_ROLE: &str = "directional";

/// Name and role of an agent; plain immutable data attached at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Unique name of the agent within a registry.
    pub name: String,
    /// Role the agent plays (e.g. "directional", "technical").
    pub role: String,
}

impl AgentIdentity {
    /// Creates an identity.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

/// A signal producer that turns a [`Context`] into an [`Output`].
///
/// Implementations must be thread-safe (`Send + Sync`) so a composer can
/// invoke several of them in parallel; they must not hold mutable state
/// shared across invocations.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{Agent, AgentIdentity, Context, Output, Result};
///
/// struct AlwaysFlat {
///     identity: AgentIdentity,
///     required: Vec<String>,
/// }
///
/// impl Agent for AlwaysFlat {
///     fn identity(&self) -> &AgentIdentity {
///         &self.identity
///     }
///
///     fn required_keys(&self) -> &[String] {
///         &self.required
///     }
///
///     fn run(&self, _context: &Context) -> Result<Option<Output>> {
///         Ok(None)
///     }
/// }
/// ```
pub trait Agent: Send + Sync {
    /// Name and role of this agent.
    fn identity(&self) -> &AgentIdentity;

    /// Context keys that must be present before [`Agent::run`] is called.
    fn required_keys(&self) -> &[String];

    /// Agent-specific logic.
    ///
    /// Returning `Ok(None)` is equivalent to returning an empty output.
    fn run(&self, context: &Context) -> Result<Option<Output>>;

    /// Validates `context`, runs the agent and stamps its identity.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::MissingContext`] naming every absent required key
    /// before any agent logic runs. Errors from [`Agent::run`] are returned
    /// unchanged.
    fn invoke(&self, context: &Context) -> Result<Output> {
        let missing = context.missing_keys(self.required_keys());
        if !missing.is_empty() {
            return Err(RondaError::MissingContext {
                agent: self.identity().name.clone(),
                keys: missing,
            });
        }

        let mut output = self.run(context)?.unwrap_or_default();
        output.stamp_identity(self.identity());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AGENT_NAME_KEY, AGENT_ROLE_KEY, MarketData, PRICE_DATA, Signal, SignalSeries};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAgent {
        identity: AgentIdentity,
        required: Vec<String>,
        calls: AtomicUsize,
        produce: bool,
    }

    impl CountingAgent {
        fn new(required: &[&str], produce: bool) -> Self {
            Self {
                identity: AgentIdentity::new("counting", DIRECTIONAL_ROLE),
                required: required.iter().map(|k| k.to_string()).collect(),
                calls: AtomicUsize::new(0),
                produce,
            }
        }
    }

    impl Agent for CountingAgent {
        fn identity(&self) -> &AgentIdentity {
            &self.identity
        }

        fn required_keys(&self) -> &[String] {
            &self.required
        }

        fn run(&self, context: &Context) -> Result<Option<Output>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.produce {
                return Ok(None);
            }
            let index = context
                .price_data()
                .map(MarketData::timestamps)
                .transpose()?
                .unwrap_or_default();
            let values = vec![Signal::Buy; index.len()];
            Ok(Some(Output::new(SignalSeries::from_parts(&index, &values)?)))
        }
    }

    fn context() -> Context {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let data = MarketData::from_columns(&[ts], vec![("close", vec![1.0])]).unwrap();
        Context::from_price_data(data).unwrap()
    }

    #[test]
    fn test_missing_keys_fail_before_run() {
        let agent = CountingAgent::new(&[PRICE_DATA, "news_data"], true);
        let err = agent.invoke(&Context::new()).unwrap_err();

        match err {
            RondaError::MissingContext { agent: name, keys } => {
                assert_eq!(name, "counting");
                assert_eq!(keys, vec![PRICE_DATA.to_string(), "news_data".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_none_becomes_empty_output_with_identity() {
        let agent = CountingAgent::new(&[], false);
        let output = agent.invoke(&Context::new()).unwrap();

        assert!(output.is_empty());
        assert_eq!(output.metadata()[AGENT_NAME_KEY], "counting");
        assert_eq!(output.metadata()[AGENT_ROLE_KEY], DIRECTIONAL_ROLE);
    }

    #[test]
    fn test_invoke_returns_agent_payload() {
        let agent = CountingAgent::new(&[PRICE_DATA], true);
        let output = agent.invoke(&context()).unwrap();

        assert_eq!(output.signals().map(|p| p.len()), Some(1));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_agent_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Agent>();
    }
}
