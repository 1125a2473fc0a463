//! Strategy trait for generating discrete trading signals.
//!
//! A [`Strategy`] is the pure signal rule: it reads indicator columns from a
//! dataset and emits one [`Signal`](crate::Signal) per row. Strategies are
//! lifted into the [`Agent`](crate::Agent) execution contract by an adapter
//! that takes care of context lookup and identity stamping.

use crate::{MarketData, Result, RondaError, SignalSeries};

/// A rule that maps a time-indexed dataset to a signal series.
///
/// Implementations should be thread-safe (`Send + Sync`) to enable parallel
/// invocation, and must not mutate the data they are given.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{MarketData, Result, Signal, SignalSeries, Strategy};
///
/// struct AlwaysLong;
///
/// impl Strategy for AlwaysLong {
///     fn name(&self) -> &str {
///         "always_long"
///     }
///
///     fn generate(&self, data: &MarketData) -> Result<SignalSeries> {
///         let index = data.timestamps()?;
///         SignalSeries::from_parts(&index, &vec![Signal::Buy; index.len()])
///     }
///
///     fn required_columns(&self) -> Vec<String> {
///         Vec::new()
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Returns the name of this strategy.
    ///
    /// The name is used for identification in logs and output metadata.
    fn name(&self) -> &str;

    /// Computes one signal per row of `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if required columns are missing or the time index
    /// cannot be read.
    fn generate(&self, data: &MarketData) -> Result<SignalSeries>;

    /// Returns the indicator columns this strategy reads.
    fn required_columns(&self) -> Vec<String>;

    /// Checks that every required column is present, listing all that are not.
    fn validate_columns(&self, data: &MarketData) -> Result<()> {
        let missing: Vec<String> = self
            .required_columns()
            .into_iter()
            .filter(|col| !data.has_column(col))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RondaError::MissingColumn(missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signal;
    use chrono::NaiveDate;

    struct TestStrategy;

    impl Strategy for TestStrategy {
        fn name(&self) -> &str {
            "test_strategy"
        }

        fn generate(&self, data: &MarketData) -> Result<SignalSeries> {
            self.validate_columns(data)?;
            let index = data.timestamps()?;
            let values = vec![Signal::Sell; index.len()];
            SignalSeries::from_parts(&index, &values)
        }

        fn required_columns(&self) -> Vec<String> {
            vec!["close".to_string(), "volume".to_string()]
        }
    }

    fn data(columns: Vec<(&str, Vec<f64>)>) -> MarketData {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        MarketData::from_columns(&[ts], columns).unwrap()
    }

    #[test]
    fn test_strategy_generate() {
        let strategy = TestStrategy;
        let series = strategy
            .generate(&data(vec![("close", vec![1.0]), ("volume", vec![10.0])]))
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.values().next(), Some(Signal::Sell));
    }

    #[test]
    fn test_validate_columns_lists_all_missing() {
        let strategy = TestStrategy;
        let err = strategy.generate(&data(vec![])).unwrap_err();
        assert_eq!(err.to_string(), "Missing required column: close, volume");
    }

    #[test]
    fn test_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn Strategy>>();
    }
}
