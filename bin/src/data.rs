//! Data loading utilities for the Ronda CLI.

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use ronda_traits::{MarketData, RondaError};

/// Load market data from a CSV file.
///
/// Date and datetime columns are parsed automatically; the file needs a
/// `timestamp` or `date` column to serve as the time index.
pub(crate) fn load_csv(path: &Path) -> Result<MarketData, RondaError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let data = MarketData::new(df);
    data.timestamp_column()?;
    Ok(data)
}

/// Keep rows whose timestamp falls within `[start, end]`, both inclusive.
pub(crate) fn slice_dates(
    data: MarketData,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<MarketData, RondaError> {
    if start.is_none() && end.is_none() {
        return Ok(data);
    }

    let keep: Vec<bool> = data
        .timestamps()?
        .iter()
        .map(|ts| {
            let day = ts.date();
            start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
        })
        .collect();
    let mask = BooleanChunked::new("keep".into(), &keep);
    Ok(MarketData::new(data.data().filter(&mask)?))
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, RondaError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| RondaError::InvalidData(format!("Invalid date format: {e}")))
}
