//! Read-only introspection over a composer's registry.

use ronda_strategies::{StrategyInfo, available_strategies};
use ronda_traits::Result;
use serde::Serialize;

use crate::{CombinationInfo, Composer};

/// One enabled strategy as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyEntry {
    /// Registered name.
    pub name: String,
    /// Role stamped into outputs.
    pub role: String,
    /// Strategy class; `None` for agents registered in code.
    pub class: Option<String>,
    /// Context keys checked before invocation.
    pub required_keys: Vec<String>,
    /// Filter gating the strategy's own signals.
    pub filter: Option<String>,
}

/// A borrowed, read-only view of a [`Composer`] registry.
///
/// Nothing reachable through a catalog executes a strategy.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    composer: &'a Composer,
}

impl<'a> Catalog<'a> {
    /// Creates a view over `composer`.
    #[must_use]
    pub const fn new(composer: &'a Composer) -> Self {
        Self { composer }
    }

    /// Enabled strategies, sorted by name.
    #[must_use]
    pub fn strategies(&self) -> Vec<StrategyEntry> {
        self.composer
            .registered()
            .map(|(name, registered)| {
                let identity = registered.agent.identity();
                StrategyEntry {
                    name: name.clone(),
                    role: identity.role.clone(),
                    class: registered.class.clone(),
                    required_keys: registered.agent.required_keys().to_vec(),
                    filter: registered.filter.clone(),
                }
            })
            .collect()
    }

    /// Every combination, sorted by name.
    pub fn combinations(&self) -> Result<Vec<CombinationInfo>> {
        self.composer
            .list_available_combinations()
            .iter()
            .map(|name| self.composer.get_combination_info(name))
            .collect()
    }

    /// Configured filters with their descriptions, sorted by name.
    #[must_use]
    pub fn filters(&self) -> Vec<(String, serde_json::Value)> {
        self.composer
            .list_available_filters()
            .into_iter()
            .filter_map(|name| {
                let description = self.composer.filter(&name)?.describe();
                Some((name, description))
            })
            .collect()
    }

    /// Built-in strategy classes a registry may instantiate.
    #[must_use]
    pub fn classes(&self) -> Vec<StrategyInfo> {
        available_strategies()
    }
}

impl Composer {
    /// A read-only catalog over this composer's registry.
    #[must_use]
    pub const fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self)
    }
}
