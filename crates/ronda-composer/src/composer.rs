//! The composer: a read-only registry plus the combination pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use ronda_combine::{AlignedSignals, Combiner};
use ronda_filters::{EligibilityFilter, mask_values};
use ronda_strategies::{StrategyAgent, build_strategy};
use ronda_traits::{
    Agent, AgentIdentity, Context, MarketData, Output, Result, RondaError, Signal, SignalPayload,
    SignalSeries, Timestamp,
};
use serde::Serialize;

use crate::config::{
    CombinationDefinition, DEFAULT_CONFIG_PATH, FailurePolicy, RegistryConfig, Settings,
};
use crate::report::{
    Execution, ExecutionReport, ExecutionStage, StrategyOutcome, StrategyStatus,
};

/// Introspection view of one combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationInfo {
    /// Combination name.
    pub name: String,
    /// Merge method name.
    pub method: String,
    /// Strategy names, in declared order.
    pub strategies: Vec<String>,
    /// Filter names, in declared order; possibly empty.
    pub filters: Vec<String>,
    /// Declared weights.
    pub weights: BTreeMap<String, f64>,
    /// Effective weighted-average threshold.
    pub threshold: f64,
    /// Failure policy.
    pub on_failure: FailurePolicy,
    /// Free-form description.
    pub description: Option<String>,
}

pub(crate) struct RegisteredStrategy {
    pub(crate) agent: Arc<dyn Agent>,
    pub(crate) class: Option<String>,
    pub(crate) filter: Option<String>,
}

struct ResolvedCombination {
    definition: CombinationDefinition,
    combiner: Box<dyn Combiner>,
    threshold: f64,
}

/// Builds a [`Composer`] from configuration plus any custom agents.
pub struct ComposerBuilder {
    config: RegistryConfig,
    agents: Vec<(String, Arc<dyn Agent>, Option<String>)>,
}

impl fmt::Debug for ComposerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposerBuilder")
            .field("config", &self.config)
            .field(
                "agents",
                &self.agents.iter().map(|(n, _, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ComposerBuilder {
    /// Starts from `config`.
    #[must_use]
    pub const fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            agents: Vec::new(),
        }
    }

    /// Registers a custom agent under `name`, replacing a configured
    /// strategy of the same name.
    #[must_use]
    pub fn register_agent(mut self, name: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        self.agents.push((name.into(), agent, None));
        self
    }

    /// Registers a custom agent whose signals are gated by the named filter.
    #[must_use]
    pub fn register_filtered_agent(
        mut self,
        name: impl Into<String>,
        agent: Arc<dyn Agent>,
        filter: impl Into<String>,
    ) -> Self {
        self.agents.push((name.into(), agent, Some(filter.into())));
        self
    }

    /// Validates the registry and builds the composer.
    ///
    /// # Errors
    ///
    /// Fails on unknown strategy classes or parameters, invalid filters,
    /// unknown filter references, and combinations whose method cannot be
    /// built from their declaration.
    pub fn build(self) -> Result<Composer> {
        let Self { config, agents } = self;

        let filters = config
            .filters
            .iter()
            .map(|(name, definition)| {
                let filter = definition.build().map_err(|e| {
                    RondaError::FilterConfiguration(format!("filter '{name}': {e}"))
                })?;
                Ok((name.clone(), Arc::<dyn EligibilityFilter>::from(filter)))
            })
            .collect::<Result<BTreeMap<String, Arc<dyn EligibilityFilter>>>>()?;

        let check_filter = |owner: &str, filter: &str| {
            if filters.contains_key(filter) {
                Ok(())
            } else {
                Err(RondaError::FilterNotFound(format!(
                    "{filter} (referenced by '{owner}')"
                )))
            }
        };

        let mut strategies = BTreeMap::new();
        let mut disabled = BTreeSet::new();
        for (name, definition) in &config.strategies {
            if !definition.enabled {
                disabled.insert(name.clone());
                continue;
            }
            let strategy = build_strategy(&definition.class, &definition.parameters)
                .map_err(|e| RondaError::Configuration(format!("strategy '{name}': {e}")))?;
            let mut agent = StrategyAgent::new(
                AgentIdentity::new(name.clone(), definition.role.clone()),
                strategy,
            );
            if let Some(key) = &definition.data_key {
                agent = agent.with_data_key(key.clone());
            }
            if let Some(keys) = &definition.required_keys {
                agent = agent.with_required_keys(keys.clone());
            }
            let agent = agent.allow_empty_input(definition.allow_empty_input);

            if let Some(filter) = &definition.filter {
                check_filter(name, filter)?;
            }
            strategies.insert(
                name.clone(),
                RegisteredStrategy {
                    agent: Arc::new(agent),
                    class: Some(definition.class.clone()),
                    filter: definition.filter.clone(),
                },
            );
        }

        for (name, agent, filter) in agents {
            if let Some(filter) = &filter {
                check_filter(&name, filter)?;
            }
            disabled.remove(&name);
            strategies.insert(
                name,
                RegisteredStrategy {
                    agent,
                    class: None,
                    filter,
                },
            );
        }

        let mut combinations = BTreeMap::new();
        for (name, definition) in &config.combinations {
            let invalid = |msg: String| RondaError::Configuration(format!("combination '{name}': {msg}"));

            if definition.strategies.is_empty() {
                return Err(invalid("lists no strategies".to_string()));
            }
            if definition.method == ronda_combine::CombinationMethod::Single
                && definition.strategies.len() != 1
            {
                return Err(invalid(format!(
                    "method 'single' requires exactly one strategy, got {}",
                    definition.strategies.len()
                )));
            }
            if let Some(unknown) = definition
                .weights
                .keys()
                .find(|w| !definition.strategies.contains(*w))
            {
                return Err(invalid(format!("weight for unlisted strategy '{unknown}'")));
            }
            for filter in &definition.filters {
                check_filter(name, filter)?;
            }

            let threshold = config.threshold_for(definition);
            let combiner = definition
                .method
                .combiner(&definition.weights, threshold)
                .map_err(|e| invalid(e.to_string()))?;
            combinations.insert(
                name.clone(),
                ResolvedCombination {
                    definition: definition.clone(),
                    combiner,
                    threshold,
                },
            );
        }

        tracing::debug!(
            strategies = strategies.len(),
            disabled = disabled.len(),
            filters = filters.len(),
            combinations = combinations.len(),
            "composer built"
        );

        Ok(Composer {
            strategies,
            disabled,
            filters,
            combinations,
            settings: config.settings,
        })
    }
}

/// Executes named strategy combinations against market data.
///
/// The registry is fixed at construction; reloading means building a new
/// composer. All methods take `&self`, so one composer can serve concurrent
/// executions from several threads.
pub struct Composer {
    strategies: BTreeMap<String, RegisteredStrategy>,
    disabled: BTreeSet<String>,
    filters: BTreeMap<String, Arc<dyn EligibilityFilter>>,
    combinations: BTreeMap<String, ResolvedCombination>,
    settings: Settings,
}

impl fmt::Debug for Composer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .field("disabled", &self.disabled)
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("combinations", &self.combinations.keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Logs stage transitions of one execution.
struct StageTracker<'a> {
    combination: &'a str,
    stage: ExecutionStage,
}

impl<'a> StageTracker<'a> {
    const fn new(combination: &'a str) -> Self {
        Self {
            combination,
            stage: ExecutionStage::Idle,
        }
    }

    fn enter(&mut self, stage: ExecutionStage) {
        tracing::debug!(combination = self.combination, from = %self.stage, to = %stage, "stage");
        self.stage = stage;
    }

    fn fail(&self, error: RondaError) -> RondaError {
        tracing::warn!(
            combination = self.combination,
            stage = %self.stage,
            to = %ExecutionStage::Failed,
            error = %error,
            "combination failed"
        );
        error
    }
}

impl Composer {
    /// Starts a builder from `config`.
    #[must_use]
    pub const fn builder(config: RegistryConfig) -> ComposerBuilder {
        ComposerBuilder::new(config)
    }

    /// Builds a composer from a parsed registry.
    pub fn from_config(config: RegistryConfig) -> Result<Self> {
        ComposerBuilder::new(config).build()
    }

    /// Builds a composer from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_config(RegistryConfig::from_yaml_str(yaml)?)
    }

    /// Builds a composer from a registry file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(RegistryConfig::from_path(path)?)
    }

    /// Builds a composer from [`DEFAULT_CONFIG_PATH`].
    pub fn from_default_config() -> Result<Self> {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }

    /// Registry-wide settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Names of enabled strategies, sorted.
    #[must_use]
    pub fn list_available_strategies(&self) -> Vec<String> {
        self.strategies.keys().cloned().collect()
    }

    /// Names of configured combinations, sorted.
    #[must_use]
    pub fn list_available_combinations(&self) -> Vec<String> {
        self.combinations.keys().cloned().collect()
    }

    /// Names of configured filters, sorted.
    #[must_use]
    pub fn list_available_filters(&self) -> Vec<String> {
        self.filters.keys().cloned().collect()
    }

    /// Describes a combination without executing it.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::CombinationNotFound`] for an unknown name.
    pub fn get_combination_info(&self, name: &str) -> Result<CombinationInfo> {
        let resolved = self.combination(name)?;
        let definition = &resolved.definition;
        Ok(CombinationInfo {
            name: name.to_string(),
            method: definition.method.to_string(),
            strategies: definition.strategies.clone(),
            filters: definition.filters.clone(),
            weights: definition.weights.clone(),
            threshold: resolved.threshold,
            on_failure: definition.on_failure,
            description: definition.description.clone(),
        })
    }

    pub(crate) fn registered(&self) -> impl Iterator<Item = (&String, &RegisteredStrategy)> + '_ {
        self.strategies.iter()
    }

    pub(crate) fn filter(&self, name: &str) -> Option<&Arc<dyn EligibilityFilter>> {
        self.filters.get(name)
    }

    fn combination(&self, name: &str) -> Result<&ResolvedCombination> {
        self.combinations
            .get(name)
            .ok_or_else(|| RondaError::CombinationNotFound(name.to_string()))
    }

    /// Looks up the combination and every strategy it lists.
    fn resolve(&self, name: &str) -> Result<(&ResolvedCombination, Vec<(&str, &RegisteredStrategy)>)> {
        let resolved = self.combination(name)?;
        let strategies = resolved
            .definition
            .strategies
            .iter()
            .map(|strategy| match self.strategies.get(strategy) {
                Some(registered) => Ok((strategy.as_str(), registered)),
                None if self.disabled.contains(strategy) => Err(RondaError::Configuration(
                    format!("combination '{name}' references disabled strategy '{strategy}'"),
                )),
                None => Err(RondaError::StrategyNotFound(format!(
                    "{strategy} (referenced by combination '{name}')"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((resolved, strategies))
    }

    /// Executes a combination and returns only the final signal series.
    ///
    /// See [`Composer::execute`].
    pub fn execute_combination(&self, name: &str, data: &MarketData) -> Result<SignalSeries> {
        Ok(self.execute(name, data)?.signals)
    }

    /// Executes a combination over `data` used as `price_data`.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::CombinationNotFound`] before any strategy runs
    /// for an unknown combination, and fails on an unusable time index.
    /// Strategy failures abort the execution unless the combination's
    /// failure policy is `skip`.
    pub fn execute(&self, name: &str, data: &MarketData) -> Result<Execution> {
        // Resolve first so an unknown name fails before the data is touched.
        self.resolve(name)?;
        let context = Context::from_price_data(data.clone())?;
        self.execute_with_context(name, &context)
    }

    /// Executes a combination against a prepared context.
    ///
    /// The context's `price_data` defines the time index of the result and
    /// is what filters are evaluated over; auxiliary datasets are passed to
    /// the strategies untouched.
    pub fn execute_with_context(&self, name: &str, context: &Context) -> Result<Execution> {
        let mut tracker = StageTracker::new(name);
        self.run_pipeline(name, context, &mut tracker)
            .map_err(|e| tracker.fail(e))
    }

    fn run_pipeline(
        &self,
        name: &str,
        context: &Context,
        tracker: &mut StageTracker<'_>,
    ) -> Result<Execution> {
        tracker.enter(ExecutionStage::Resolving);
        let (resolved, strategies) = self.resolve(name)?;
        let definition = &resolved.definition;
        let data = context.price_data().ok_or_else(|| RondaError::MissingContext {
            agent: name.to_string(),
            keys: vec![ronda_traits::PRICE_DATA.to_string()],
        })?;
        let dataset_index: BTreeSet<Timestamp> = data.validate_index()?.into_iter().collect();

        tracker.enter(ExecutionStage::Invoking);
        let outputs = self.invoke_all(&strategies, context);

        let mut statuses = Vec::with_capacity(strategies.len());
        let mut voting: Vec<(&str, SignalSeries)> = Vec::new();
        for ((strategy, registered), result) in strategies.iter().zip(outputs) {
            let role = registered.agent.identity().role.clone();
            let gated = result.and_then(|output| {
                self.strategy_series(strategy, registered, output, data, &dataset_index)
            });
            let outcome = match gated {
                Ok(Some(series)) => {
                    let rows = series.len();
                    voting.push((*strategy, series));
                    StrategyOutcome::Signals { rows }
                }
                Ok(None) => {
                    if definition.method.counts_abstentions() {
                        voting.push((*strategy, SignalSeries::new()));
                    }
                    StrategyOutcome::Empty
                }
                Err(error) => {
                    let error = error.in_strategy(strategy, &role);
                    if definition.on_failure == FailurePolicy::Abort {
                        return Err(error);
                    }
                    tracing::warn!(combination = name, strategy = *strategy, error = %error, "strategy skipped");
                    StrategyOutcome::Skipped {
                        error: error.to_string(),
                    }
                }
            };
            statuses.push(StrategyStatus {
                name: (*strategy).to_string(),
                role,
                outcome,
            });
        }

        tracker.enter(ExecutionStage::Merging);
        let aligned = AlignedSignals::outer(voting.iter().map(|(n, s)| (*n, s)));
        let mut merged = if aligned.is_empty() {
            SignalSeries::new()
        } else {
            let combined = resolved.combiner.combine(&aligned.scores)?;
            aligned.to_series(&combined)
        };

        tracker.enter(ExecutionStage::Filtering);
        let mut zeroed = 0;
        if !definition.filters.is_empty() && !merged.is_empty() {
            let eligible = self.eligibility(&definition.filters, data)?;
            zeroed = gate(&mut merged, &eligible);
        }

        tracker.enter(ExecutionStage::Done);
        let (sell, hold, buy) = merged.counts();
        tracing::debug!(combination = name, rows = merged.len(), buy, hold, sell, zeroed, "combination done");

        Ok(Execution {
            signals: merged,
            report: ExecutionReport {
                combination: name.to_string(),
                method: definition.method,
                stage: ExecutionStage::Done,
                strategies: statuses,
                zeroed_by_filter: zeroed,
            },
        })
    }

    /// Invokes every strategy, returning results in declared order.
    fn invoke_all(
        &self,
        strategies: &[(&str, &RegisteredStrategy)],
        context: &Context,
    ) -> Vec<Result<Output>> {
        if self.settings.parallel {
            strategies
                .par_iter()
                .map(|(_, registered)| registered.agent.invoke(context))
                .collect()
        } else {
            strategies
                .iter()
                .map(|(_, registered)| registered.agent.invoke(context))
                .collect()
        }
    }

    /// The strategy's vote series on the dataset index, gated by its own
    /// filter; `None` for an empty output.
    fn strategy_series(
        &self,
        strategy: &str,
        registered: &RegisteredStrategy,
        output: Output,
        data: &MarketData,
        dataset_index: &BTreeSet<Timestamp>,
    ) -> Result<Option<SignalSeries>> {
        if output.is_empty() {
            return Ok(None);
        }
        let mut series: SignalSeries = match output.into_signals() {
            Some(SignalPayload::Series(series)) => series
                .iter()
                .filter(|(ts, _)| dataset_index.contains(*ts))
                .map(|(ts, s)| (*ts, s))
                .collect(),
            Some(SignalPayload::Panel(_)) => {
                return Err(RondaError::InvalidData(format!(
                    "Strategy '{strategy}' returned a multi-instrument panel; combinations take one series per strategy"
                )));
            }
            None => return Ok(None),
        };
        if series.is_empty() {
            return Ok(None);
        }

        if let Some(filter) = &registered.filter {
            let eligible = self.eligibility(std::slice::from_ref(filter), data)?;
            let zeroed = gate(&mut series, &eligible);
            tracing::debug!(strategy, filter = %filter, zeroed, "strategy filter applied");
        }
        Ok(Some(series))
    }

    /// Timestamps of `data` admitted by every named filter.
    fn eligibility(&self, names: &[String], data: &MarketData) -> Result<BTreeMap<Timestamp, bool>> {
        let index = data.timestamps()?;
        let mut eligible = vec![true; index.len()];
        for name in names {
            let filter = self
                .filters
                .get(name)
                .ok_or_else(|| RondaError::FilterNotFound(name.clone()))?;
            let mask = mask_values(&filter.apply(data)?);
            if mask.len() != eligible.len() {
                return Err(RondaError::InvalidData(format!(
                    "Filter '{name}' produced {} mask rows for {} data rows",
                    mask.len(),
                    eligible.len()
                )));
            }
            for (slot, ok) in eligible.iter_mut().zip(mask) {
                *slot = *slot && ok;
            }
        }
        Ok(index.into_iter().zip(eligible).collect())
    }
}

/// Forces ineligible directional signals to hold; returns how many changed.
fn gate(series: &mut SignalSeries, eligible: &BTreeMap<Timestamp, bool>) -> usize {
    let blocked: Vec<Timestamp> = series
        .iter()
        .filter(|(ts, s)| s.is_directional() && !eligible.get(*ts).copied().unwrap_or(false))
        .map(|(ts, _)| *ts)
        .collect();
    for ts in &blocked {
        series.insert(*ts, Signal::Hold);
    }
    blocked.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_gate_only_downgrades() {
        let mut series =
            SignalSeries::from_parts(&[day(1), day(2), day(3)], &[Signal::Buy, Signal::Hold, Signal::Sell])
                .unwrap();
        let eligible = BTreeMap::from([(day(1), false), (day(2), false), (day(3), true)]);

        let zeroed = gate(&mut series, &eligible);

        assert_eq!(zeroed, 1);
        assert_eq!(
            series.values().collect::<Vec<_>>(),
            vec![Signal::Hold, Signal::Hold, Signal::Sell]
        );
    }

    #[test]
    fn test_builder_rejects_bad_registry() {
        let unknown_class = "strategies:\n  a:\n    class: Astrology\n";
        assert!(Composer::from_yaml_str(unknown_class).is_err());

        let single = "strategies:\n  a:\n    class: RSIReversion\n  b:\n    class: MACDCross\ncombinations:\n  c:\n    strategies: [a, b]\n    method: single\n";
        assert!(matches!(
            Composer::from_yaml_str(single),
            Err(RondaError::Configuration(_))
        ));

        let missing_filter = "strategies:\n  a:\n    class: RSIReversion\n    filter: nope\n";
        assert!(matches!(
            Composer::from_yaml_str(missing_filter),
            Err(RondaError::FilterNotFound(_))
        ));

        let empty_composite = "filters:\n  f:\n    type: composite\n";
        assert!(matches!(
            Composer::from_yaml_str(empty_composite),
            Err(RondaError::FilterConfiguration(_))
        ));

        let stray_weight = "strategies:\n  a:\n    class: RSIReversion\ncombinations:\n  c:\n    strategies: [a]\n    method: weighted_average\n    weights: { b: 2 }\n";
        assert!(Composer::from_yaml_str(stray_weight).is_err());
    }

    #[test]
    fn test_disabled_strategies_are_hidden() {
        let yaml = "strategies:\n  live:\n    class: RSIReversion\n  retired:\n    class: MACDCross\n    enabled: false\ncombinations:\n  c:\n    strategies: [live, retired]\n";
        let composer = Composer::from_yaml_str(yaml).unwrap();
        assert_eq!(composer.list_available_strategies(), vec!["live"]);

        let err = composer.execute_combination("c", &MarketData::default()).unwrap_err();
        assert!(matches!(err, RondaError::Configuration(_)));
    }

    #[test]
    fn test_composer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Composer>();
    }
}
