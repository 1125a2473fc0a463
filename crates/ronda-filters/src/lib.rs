//! Eligibility filters for ronda signal series.
//!
//! A filter evaluates a per-row boolean mask over a dataset; rows where the
//! mask is `false` may not carry a trade. Atomic filters check one family of
//! conditions and take their thresholds as construction-time configuration.
//! An unset bound is not enforced. [`CompositeFilter`] combines any number of
//! filters with `AND` or `OR` logic.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ronda_filters::{
//!     CompositeFilter, EligibilityFilter, FilterLogic, LiquidityFilter, LiquidityFilterConfig,
//!     StockFilter, StockFilterConfig,
//! };
//! # fn run(data: &ronda_traits::MarketData) -> ronda_traits::Result<()> {
//! let stock = StockFilter::new(StockFilterConfig {
//!     min_price: Some(5.0),
//!     ..Default::default()
//! });
//! let liquidity = LiquidityFilter::new(LiquidityFilterConfig {
//!     min_avg_volume: Some(1_000_000.0),
//!     ..Default::default()
//! })?;
//!
//! let filter = CompositeFilter::new(vec![Box::new(stock), Box::new(liquidity)], FilterLogic::And)?;
//! let mask = filter.apply(data)?;
//! # Ok(())
//! # }
//! ```

mod composite;
mod definition;
mod filter;
mod liquidity;
mod stock;
mod time;
mod volatility;

pub use composite::{CompositeFilter, FilterLogic};
pub use definition::FilterDefinition;
pub use filter::{EligibilityFilter, MASK_NAME, mask_from, mask_values};
pub use liquidity::{LiquidityFilter, LiquidityFilterConfig};
pub use stock::{StockFilter, StockFilterConfig};
pub use time::{MARKET_HOLIDAYS_2024, TimeFilter, TimeFilterConfig};
pub use volatility::{VolatilityRegimeConfig, VolatilityRegimeFilter};
