//! Calendar and time-of-day eligibility.

use chrono::{Duration, NaiveDate, NaiveTime};
use polars::prelude::BooleanChunked;
use ronda_traits::{MarketData, Result, RondaError, TIMESTAMP_COLUMNS};
use serde::{Deserialize, Serialize};

use crate::filter::{EligibilityFilter, mask_from, row_groups};

/// US market holidays observed in 2024.
pub const MARKET_HOLIDAYS_2024: [(i32, u32, u32); 10] = [
    (2024, 1, 1),
    (2024, 1, 15),
    (2024, 2, 19),
    (2024, 3, 29),
    (2024, 5, 27),
    (2024, 6, 19),
    (2024, 7, 4),
    (2024, 9, 2),
    (2024, 11, 28),
    (2024, 12, 25),
];

fn default_market_holidays() -> Vec<NaiveDate> {
    MARKET_HOLIDAYS_2024
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

const fn default_true() -> bool {
    true
}

const fn default_earnings_window() -> i64 {
    1
}

/// Configuration for [`TimeFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeFilterConfig {
    /// Dates that are never eligible.
    pub exclude_dates: Vec<NaiveDate>,
    /// When non-empty, only these dates are eligible.
    pub include_dates: Vec<NaiveDate>,
    /// Earliest eligible time of day, `HH:MM` or `HH:MM:SS`.
    pub start_time: Option<String>,
    /// Latest eligible time of day, `HH:MM` or `HH:MM:SS`.
    pub end_time: Option<String>,
    /// Whether to exclude rows around earnings announcements.
    pub exclude_earnings_periods: bool,
    /// Earnings announcement dates.
    pub earnings_dates: Vec<NaiveDate>,
    /// Days on either side of an announcement that are excluded.
    #[serde(default = "default_earnings_window")]
    pub earnings_window_days: i64,
    /// Whether to exclude market holidays.
    #[serde(default = "default_true")]
    pub exclude_market_holidays: bool,
    /// Holiday calendar; defaults to the 2024 US market holidays.
    #[serde(default = "default_market_holidays")]
    pub market_holidays: Vec<NaiveDate>,
    /// Minimum number of eligible rows an instrument needs to stay eligible.
    pub min_trading_days: Option<usize>,
}

impl Default for TimeFilterConfig {
    fn default() -> Self {
        Self {
            exclude_dates: Vec::new(),
            include_dates: Vec::new(),
            start_time: None,
            end_time: None,
            exclude_earnings_periods: false,
            earnings_dates: Vec::new(),
            earnings_window_days: default_earnings_window(),
            exclude_market_holidays: true,
            market_holidays: default_market_holidays(),
            min_trading_days: None,
        }
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| {
            RondaError::FilterConfiguration(format!("{field} '{value}' is not a time of day: {e}"))
        })
}

/// Filters rows by calendar date and time of day.
///
/// Rules apply in order: date lists, holidays, earnings windows, the
/// time-of-day window, and finally the per-instrument trading-day minimum,
/// which counts rows that passed the earlier rules.
#[derive(Debug, Clone)]
pub struct TimeFilter {
    config: TimeFilterConfig,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
}

impl TimeFilter {
    /// Create a time filter, parsing the time-of-day window.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::FilterConfiguration`] when a time cannot be
    /// parsed, when the start is after the end, or when the earnings window
    /// is negative.
    pub fn new(config: TimeFilterConfig) -> Result<Self> {
        let start = config
            .start_time
            .as_deref()
            .map(|v| parse_time("start_time", v))
            .transpose()?;
        let end = config
            .end_time
            .as_deref()
            .map(|v| parse_time("end_time", v))
            .transpose()?;

        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(RondaError::FilterConfiguration(format!(
                "start_time {s} is after end_time {e}"
            )));
        }
        if config.earnings_window_days < 0 {
            return Err(RondaError::FilterConfiguration(format!(
                "earnings_window_days must be non-negative, got {}",
                config.earnings_window_days
            )));
        }

        Ok(Self { config, start, end })
    }

    /// The filter configuration.
    #[must_use]
    pub const fn config(&self) -> &TimeFilterConfig {
        &self.config
    }

    fn near_earnings(&self, date: NaiveDate) -> bool {
        let window = Duration::days(self.config.earnings_window_days);
        self.config
            .earnings_dates
            .iter()
            .any(|&announced| (date - announced).abs() <= window)
    }
}

impl EligibilityFilter for TimeFilter {
    fn name(&self) -> &str {
        "time"
    }

    fn apply(&self, data: &MarketData) -> Result<BooleanChunked> {
        if !TIMESTAMP_COLUMNS.iter().any(|c| data.has_column(c)) {
            tracing::warn!(filter = self.name(), "no time column, all rows eligible");
            return Ok(mask_from(&vec![true; data.len()]));
        }

        let cfg = &self.config;
        let mut mask: Vec<bool> = data
            .timestamps()?
            .into_iter()
            .map(|ts| {
                let date = ts.date();
                let time = ts.time();
                !cfg.exclude_dates.contains(&date)
                    && (cfg.include_dates.is_empty() || cfg.include_dates.contains(&date))
                    && !(cfg.exclude_market_holidays && cfg.market_holidays.contains(&date))
                    && !(cfg.exclude_earnings_periods && self.near_earnings(date))
                    && self.start.is_none_or(|s| time >= s)
                    && self.end.is_none_or(|e| time <= e)
            })
            .collect();

        if let Some(min_days) = cfg.min_trading_days {
            for rows in row_groups(data)? {
                let eligible = rows.iter().filter(|&&row| mask[row]).count();
                if eligible < min_days {
                    rows.iter().for_each(|&row| mask[row] = false);
                }
            }
        }

        Ok(mask_from(&mask))
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "filter_type": self.name(), "config": self.config })
    }
}
