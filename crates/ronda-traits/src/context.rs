//! Per-invocation input bundle handed to every agent.
//!
//! A [`Context`] carries the datasets an agent may read, the caller's
//! preferences and diagnostic run metadata. It is never mutated after it has
//! been shared: [`Context::with_updates`] and friends return a new value.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{MarketData, Result, RondaError};

/// Key of the primary price/indicator dataset.
pub const PRICE_DATA: &str = "price_data";

/// Key of the optional news/headline dataset.
pub const NEWS_DATA: &str = "news_data";

/// Key of the optional alternative disclosures dataset (e.g. insider or
/// politician trades).
pub const ALTERNATIVE_DISCLOSURES: &str = "alternative_disclosures";

/// Datasets, preferences and metadata for one agent invocation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: BTreeMap<String, MarketData>,
    preferences: BTreeMap<String, Value>,
    metadata: BTreeMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context holding `price_data`.
    pub fn from_price_data(price_data: MarketData) -> Result<Self> {
        Self::new().with_dataset(PRICE_DATA, price_data)
    }

    /// Returns a copy of this context with `data` stored under `key`.
    ///
    /// The dataset must expose a timestamp-like index column.
    pub fn with_dataset(&self, key: impl Into<String>, data: MarketData) -> Result<Self> {
        let key = key.into();
        data.timestamp_column().map_err(|_| {
            RondaError::InvalidData(format!("Dataset '{key}' has no timestamp or date column"))
        })?;

        let mut next = self.clone();
        next.data.insert(key, data);
        Ok(next)
    }

    /// Returns a copy of this context with every dataset in `updates` merged in.
    ///
    /// Later entries win over existing ones with the same key.
    pub fn with_updates(
        &self,
        updates: impl IntoIterator<Item = (String, MarketData)>,
    ) -> Result<Self> {
        updates
            .into_iter()
            .try_fold(self.clone(), |ctx, (key, data)| ctx.with_dataset(key, data))
    }

    /// Returns a copy of this context with a caller preference set.
    #[must_use]
    pub fn with_preference(&self, key: impl Into<String>, value: Value) -> Self {
        let mut next = self.clone();
        next.preferences.insert(key.into(), value);
        next
    }

    /// Returns a copy of this context with a metadata entry set.
    #[must_use]
    pub fn with_metadata(&self, key: impl Into<String>, value: Value) -> Self {
        let mut next = self.clone();
        next.metadata.insert(key.into(), value);
        next
    }

    /// Dataset stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MarketData> {
        self.data.get(key)
    }

    /// Whether a dataset is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Keys among `keys` with no dataset, in the order given.
    #[must_use]
    pub fn missing_keys<S: AsRef<str>>(&self, keys: &[S]) -> Vec<String> {
        keys.iter()
            .map(|key| key.as_ref())
            .filter(|key| !self.contains(key))
            .map(str::to_string)
            .collect()
    }

    /// Fetches several datasets at once, failing with every missing key.
    pub fn require<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<&MarketData>> {
        let missing = self.missing_keys(keys);
        if !missing.is_empty() {
            return Err(RondaError::MissingContext {
                agent: "context".to_string(),
                keys: missing,
            });
        }
        Ok(keys
            .iter()
            .filter_map(|key| self.data.get(key.as_ref()))
            .collect())
    }

    /// The primary price/indicator dataset.
    #[must_use]
    pub fn price_data(&self) -> Option<&MarketData> {
        self.get(PRICE_DATA)
    }

    /// The news dataset.
    #[must_use]
    pub fn news_data(&self) -> Option<&MarketData> {
        self.get(NEWS_DATA)
    }

    /// The alternative disclosures dataset.
    #[must_use]
    pub fn alternative_disclosures(&self) -> Option<&MarketData> {
        self.get(ALTERNATIVE_DISCLOSURES)
    }

    /// Caller preference stored under `key`.
    #[must_use]
    pub fn preference(&self, key: &str) -> Option<&Value> {
        self.preferences.get(key)
    }

    /// All caller preferences.
    #[must_use]
    pub const fn preferences(&self) -> &BTreeMap<String, Value> {
        &self.preferences
    }

    /// Run metadata stored under `key`.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// All run metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Keys of all attached datasets, sorted.
    pub fn dataset_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;
    use chrono::NaiveDate;
    use serde_json::json;

    fn prices() -> MarketData {
        let ts: Timestamp = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        MarketData::from_columns(&[ts], vec![("close", vec![100.0])]).unwrap()
    }

    #[test]
    fn test_empty_context_reports_all_missing_keys() {
        let ctx = Context::new();
        assert_eq!(
            ctx.missing_keys(&[PRICE_DATA, NEWS_DATA]),
            vec![PRICE_DATA.to_string(), NEWS_DATA.to_string()]
        );

        match ctx.require(&[PRICE_DATA, NEWS_DATA]) {
            Err(RondaError::MissingContext { keys, .. }) => assert_eq!(keys.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_with_dataset_returns_new_value() {
        let base = Context::new().with_preference("risk", json!("low"));
        let derived = base.with_dataset(PRICE_DATA, prices()).unwrap();

        assert!(base.price_data().is_none());
        assert!(derived.price_data().is_some());
        assert_eq!(derived.preference("risk"), Some(&json!("low")));
    }

    #[test]
    fn test_with_dataset_requires_index() {
        let df = polars::df! { "close" => &[1.0] }.unwrap();
        let result = Context::new().with_dataset(NEWS_DATA, MarketData::new(df));
        assert!(matches!(result, Err(RondaError::InvalidData(_))));
    }

    #[test]
    fn test_with_updates_merges() {
        let ctx = Context::from_price_data(prices())
            .unwrap()
            .with_updates(vec![(NEWS_DATA.to_string(), prices())])
            .unwrap();

        assert!(ctx.news_data().is_some());
        assert!(ctx.alternative_disclosures().is_none());
        assert_eq!(ctx.dataset_keys().collect::<Vec<_>>(), vec![NEWS_DATA, PRICE_DATA]);
        assert_eq!(ctx.require(&[PRICE_DATA]).unwrap().len(), 1);
    }

    #[test]
    fn test_metadata_is_copied_not_shared() {
        let base = Context::new();
        let tagged = base.with_metadata("run_id", json!(7));
        assert!(base.metadata().is_empty());
        assert_eq!(tagged.metadata_value("run_id"), Some(&json!(7)));
    }
}
