//! Core trait definition for eligibility filters.

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::*;
use ronda_traits::{MarketData, Result, RondaError};

/// Name given to every mask series produced by a filter.
pub const MASK_NAME: &str = "eligible";

/// A per-row eligibility predicate over a dataset.
///
/// `apply` returns a boolean mask with exactly one entry per input row, in
/// input order. Filters hold only their construction-time configuration, so
/// the same data always yields the same mask, and they never modify the data.
pub trait EligibilityFilter: Send + Sync + fmt::Debug {
    /// Short name of the filter kind, used in logs and introspection.
    fn name(&self) -> &str;

    /// Evaluates the filter over every row of `data`.
    fn apply(&self, data: &MarketData) -> Result<BooleanChunked>;

    /// Describes the filter configuration.
    fn describe(&self) -> serde_json::Value;
}

/// Builds a mask from plain booleans.
pub fn mask_from(values: &[bool]) -> BooleanChunked {
    BooleanChunked::from_slice(MASK_NAME.into(), values)
}

/// Reads a mask back into plain booleans; nulls are ineligible.
pub fn mask_values(mask: &BooleanChunked) -> Vec<bool> {
    mask.into_iter().map(|v| v.unwrap_or(false)).collect()
}

/// Fails unless `mask` has one entry per row of `data`.
pub(crate) fn check_alignment(filter: &str, mask: &BooleanChunked, data: &MarketData) -> Result<()> {
    if mask.len() == data.len() {
        Ok(())
    } else {
        Err(RondaError::InvalidData(format!(
            "Filter '{}' produced {} mask rows for {} data rows",
            filter,
            mask.len(),
            data.len()
        )))
    }
}

/// Reads `column` if present; a bound on an absent column is not enforced.
pub(crate) fn optional_column(
    data: &MarketData,
    filter: &str,
    column: &str,
) -> Result<Option<Vec<Option<f64>>>> {
    if data.has_column(column) {
        data.float_column(column).map(Some)
    } else {
        tracing::warn!(filter, column, "column absent, bound not enforced");
        Ok(None)
    }
}

/// Clears every mask entry whose value is missing or fails `keep`.
pub(crate) fn restrict(mask: &mut [bool], values: &[Option<f64>], keep: impl Fn(f64) -> bool) {
    for (slot, value) in mask.iter_mut().zip(values) {
        *slot = *slot && value.is_some_and(&keep);
    }
}

/// Row indices grouped by instrument, preserving row order within a group.
///
/// Datasets without a `symbol` column form a single group.
pub(crate) fn row_groups(data: &MarketData) -> Result<Vec<Vec<usize>>> {
    let Some(symbols) = data.symbols()? else {
        return Ok(vec![(0..data.len()).collect()]);
    };

    let mut groups: BTreeMap<Option<String>, Vec<usize>> = BTreeMap::new();
    for (row, symbol) in symbols.into_iter().enumerate() {
        groups.entry(symbol).or_default().push(row);
    }
    Ok(groups.into_values().collect())
}

/// Trailing mean over `window` rows of `values[rows]`, ignoring missing values.
///
/// Entries with fewer than `min_periods` observed values in their window are
/// `None`.
pub(crate) fn rolling_mean(
    values: &[Option<f64>],
    rows: &[usize],
    window: usize,
    min_periods: usize,
) -> Vec<Option<f64>> {
    (0..rows.len())
        .map(|pos| {
            let start = (pos + 1).saturating_sub(window);
            let observed: Vec<f64> = rows[start..=pos]
                .iter()
                .filter_map(|&row| values[row])
                .collect();
            if observed.len() < min_periods.max(1) {
                None
            } else {
                Some(observed.iter().sum::<f64>() / observed.len() as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_round_trip() {
        let mask = mask_from(&[true, false, true]);
        assert_eq!(mask.len(), 3);
        assert_eq!(mask_values(&mask), vec![true, false, true]);
    }

    #[test]
    fn test_restrict_drops_missing_values() {
        let mut mask = vec![true, true, true, false];
        restrict(&mut mask, &[Some(10.0), None, Some(1.0), Some(10.0)], |v| v >= 5.0);
        assert_eq!(mask, vec![true, false, false, false]);
    }

    #[test]
    fn test_rolling_mean_min_periods() {
        let values = [Some(1.0), Some(3.0), None, Some(5.0)];
        let rows = [0, 1, 2, 3];

        let loose = rolling_mean(&values, &rows, 2, 1);
        assert_eq!(loose, vec![Some(1.0), Some(2.0), Some(3.0), Some(5.0)]);

        let strict = rolling_mean(&values, &rows, 2, 2);
        assert_eq!(strict, vec![None, Some(2.0), None, None]);
    }
}
