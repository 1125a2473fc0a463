//! Boolean composition of eligibility filters.

use std::fmt;
use std::str::FromStr;

use polars::prelude::BooleanChunked;
use ronda_traits::{MarketData, Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::filter::{EligibilityFilter, check_alignment};

/// How a composite filter combines its children's masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    /// Every child must admit the row.
    #[default]
    And,
    /// At least one child must admit the row.
    Or,
}

impl FromStr for FilterLogic {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(RondaError::FilterConfiguration(format!(
                "Logic must be 'AND' or 'OR', got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for FilterLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Elementwise AND/OR over an ordered, non-empty list of child filters.
#[derive(Debug)]
pub struct CompositeFilter {
    children: Vec<Box<dyn EligibilityFilter>>,
    logic: FilterLogic,
}

impl CompositeFilter {
    /// Create a composite over `children`.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::FilterConfiguration`] when `children` is empty.
    pub fn new(children: Vec<Box<dyn EligibilityFilter>>, logic: FilterLogic) -> Result<Self> {
        if children.is_empty() {
            return Err(RondaError::FilterConfiguration(
                "Composite filter needs at least one child filter".to_string(),
            ));
        }
        Ok(Self { children, logic })
    }

    /// Create a composite from a logic mode given as text (`"AND"` / `"OR"`,
    /// case-insensitive).
    pub fn from_logic_str(children: Vec<Box<dyn EligibilityFilter>>, logic: &str) -> Result<Self> {
        Self::new(children, logic.parse()?)
    }

    /// The combining logic.
    #[must_use]
    pub const fn logic(&self) -> FilterLogic {
        self.logic
    }

    /// The child filters, in evaluation order.
    #[must_use]
    pub fn children(&self) -> &[Box<dyn EligibilityFilter>] {
        &self.children
    }
}

impl EligibilityFilter for CompositeFilter {
    fn name(&self) -> &str {
        "composite"
    }

    fn apply(&self, data: &MarketData) -> Result<BooleanChunked> {
        let mut combined: Option<BooleanChunked> = None;
        for child in &self.children {
            let mask = child.apply(data)?;
            check_alignment(child.name(), &mask, data)?;
            combined = Some(match combined {
                None => mask,
                Some(acc) => match self.logic {
                    FilterLogic::And => &acc & &mask,
                    FilterLogic::Or => &acc | &mask,
                },
            });
        }
        // `new` guarantees at least one child.
        combined.ok_or_else(|| RondaError::FilterConfiguration("empty composite filter".into()))
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "filter_type": self.name(),
            "logic": self.logic,
            "filters": self.children.iter().map(|c| c.describe()).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{mask_from, mask_values};
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct Fixed(Vec<bool>);

    impl EligibilityFilter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn apply(&self, _data: &MarketData) -> Result<BooleanChunked> {
            Ok(mask_from(&self.0))
        }

        fn describe(&self) -> serde_json::Value {
            serde_json::json!({ "filter_type": "fixed" })
        }
    }

    fn data(rows: u32) -> MarketData {
        let index: Vec<_> = (1..=rows)
            .map(|d| {
                NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            })
            .collect();
        MarketData::from_columns(&index, vec![("close", vec![1.0; rows as usize])]).unwrap()
    }

    fn children() -> Vec<Box<dyn EligibilityFilter>> {
        vec![
            Box::new(Fixed(vec![true, true, false, false])),
            Box::new(Fixed(vec![true, false, true, false])),
        ]
    }

    #[test]
    fn test_and_logic() {
        let filter = CompositeFilter::new(children(), FilterLogic::And).unwrap();
        let mask = filter.apply(&data(4)).unwrap();
        assert_eq!(mask_values(&mask), vec![true, false, false, false]);
    }

    #[test]
    fn test_or_logic() {
        let filter = CompositeFilter::from_logic_str(children(), "or").unwrap();
        let mask = filter.apply(&data(4)).unwrap();
        assert_eq!(mask_values(&mask), vec![true, true, true, false]);
    }

    #[test]
    fn test_empty_children_fail_at_construction() {
        let result = CompositeFilter::new(Vec::new(), FilterLogic::And);
        assert!(matches!(result, Err(RondaError::FilterConfiguration(_))));
    }

    #[test]
    fn test_unknown_logic_fails_at_construction() {
        let result = CompositeFilter::from_logic_str(children(), "XOR");
        assert!(matches!(result, Err(RondaError::FilterConfiguration(_))));
    }

    #[test]
    fn test_misaligned_child_is_rejected() {
        let filter =
            CompositeFilter::new(vec![Box::new(Fixed(vec![true, false]))], FilterLogic::Or)
                .unwrap();
        assert!(filter.apply(&data(4)).is_err());
    }

    #[test]
    fn test_describe_lists_children() {
        let filter = CompositeFilter::new(children(), FilterLogic::And).unwrap();
        let info = filter.describe();
        assert_eq!(info["logic"], "AND");
        assert_eq!(info["filters"].as_array().map(Vec::len), Some(2));
    }
}
