//! Common types used throughout the Ronda framework.
//!
//! This module defines the tabular dataset wrapper handed to strategies and
//! filters, together with the timestamp and symbol aliases used to index it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use polars::prelude::*;

use crate::{Result, RondaError};

/// A point on the time axis of a dataset.
pub type Timestamp = chrono::NaiveDateTime;

/// A market symbol identifier, e.g. "AAPL".
pub type Symbol = String;

/// Column names recognised as the time index, in order of preference.
pub const TIMESTAMP_COLUMNS: [&str; 2] = ["timestamp", "date"];

/// Column holding the instrument identifier in multi-instrument datasets.
pub const SYMBOL_COLUMN: &str = "symbol";

/// Days between 0001-01-01 (CE) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Container for a time-indexed tabular dataset.
///
/// `MarketData` wraps a Polars DataFrame carrying prices, volumes and any
/// precomputed indicator columns. Rows are keyed by a `timestamp` (or `date`)
/// column that is expected to be ascending and unique; see
/// [`MarketData::validate_index`].
///
/// Cloning is cheap: Polars columns are reference counted, so a clone never
/// copies the underlying buffers and never aliases mutable state.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::MarketData;
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let data = MarketData::from_columns(
///     &[day(2), day(3)],
///     vec![("close", vec![150.0, 151.5]), ("volume", vec![1.2e6, 9.8e5])],
/// )
/// .unwrap();
/// assert_eq!(data.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Builds a dataset from a timestamp index and named float columns.
    ///
    /// `NaN` values are read back as missing by [`MarketData::float_column`].
    pub fn from_columns<'a>(
        timestamps: &[Timestamp],
        columns: impl IntoIterator<Item = (&'a str, Vec<f64>)>,
    ) -> Result<Self> {
        let millis: Vec<i64> = timestamps
            .iter()
            .map(|ts| ts.and_utc().timestamp_millis())
            .collect();
        let index = Series::new(TIMESTAMP_COLUMNS[0].into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let mut frame_columns = vec![Column::from(index)];
        for (name, values) in columns {
            if values.len() != timestamps.len() {
                return Err(RondaError::InvalidData(format!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    timestamps.len()
                )));
            }
            frame_columns.push(Column::from(Series::new(name.into(), values)));
        }

        Ok(Self::new(DataFrame::new(frame_columns)?))
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the dataset has zero rows.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Returns the column names in the dataset.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists in the dataset.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    /// Returns the name of the column acting as the time index.
    pub fn timestamp_column(&self) -> Result<&'static str> {
        TIMESTAMP_COLUMNS
            .iter()
            .copied()
            .find(|name| self.has_column(name))
            .ok_or_else(|| RondaError::MissingColumn(TIMESTAMP_COLUMNS.join(" or ")))
    }

    /// Reads the time index as chrono timestamps.
    ///
    /// Both `Date` and `Datetime` columns are accepted. Null timestamps are
    /// rejected because every row must be addressable.
    pub fn timestamps(&self) -> Result<Vec<Timestamp>> {
        let name = self.timestamp_column()?;
        let series = self.data.column(name)?.as_materialized_series();

        let converted: Vec<Option<Timestamp>> = match series.dtype() {
            DataType::Date => series
                .date()?
                .into_iter()
                .map(|d: Option<i32>| d.and_then(timestamp_from_days))
                .collect(),
            DataType::Datetime(unit, _) => {
                let unit = *unit;
                series
                    .datetime()?
                    .into_iter()
                    .map(|v: Option<i64>| v.and_then(|v| timestamp_from_unit(v, unit)))
                    .collect()
            }
            other => {
                return Err(RondaError::InvalidData(format!(
                    "Column '{name}' has type {other}, expected a date or datetime"
                )));
            }
        };

        converted
            .into_iter()
            .enumerate()
            .map(|(row, ts)| {
                ts.ok_or_else(|| {
                    RondaError::InvalidData(format!("Missing timestamp at row {row}"))
                })
            })
            .collect()
    }

    /// Checks that the time index is strictly ascending.
    pub fn validate_index(&self) -> Result<Vec<Timestamp>> {
        let index = self.timestamps()?;
        if let Some(pair) = index.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(RondaError::InvalidData(format!(
                "Timestamps must be ascending and unique, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        Ok(index)
    }

    /// Reads a numeric column as `f64`, mapping nulls and `NaN` to `None`.
    pub fn float_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .data
            .column(name)
            .map_err(|_| RondaError::MissingColumn(name.to_string()))?;
        let casted = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(casted
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Reads the `symbol` column, if the dataset has one.
    pub fn symbols(&self) -> Result<Option<Vec<Option<String>>>> {
        if !self.has_column(SYMBOL_COLUMN) {
            return Ok(None);
        }
        let series = self.data.column(SYMBOL_COLUMN)?.as_materialized_series();
        Ok(Some(
            series
                .str()?
                .into_iter()
                .map(|s: Option<&str>| s.map(str::to_string))
                .collect(),
        ))
    }
}

fn timestamp_from_days(days: i32) -> Option<Timestamp> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn timestamp_from_unit(value: i64, unit: TimeUnit) -> Option<Timestamp> {
    let dt = match unit {
        TimeUnit::Milliseconds => DateTime::<Utc>::from_timestamp_millis(value)?,
        TimeUnit::Microseconds => DateTime::<Utc>::from_timestamp_micros(value)?,
        TimeUnit::Nanoseconds => DateTime::<Utc>::from_timestamp_nanos(value),
    };
    Some(dt.naive_utc())
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}
