//! Project-level cost items outside the treatment model

use serde::{Deserialize, Serialize};

use crate::config::ConfigurationContext;

/// Depreciation method for capital items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    #[default]
    None,
    StraightLine,
    DecliningBalance,
}

/// Depreciation terms; reporting only, never changes cash flows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Depreciation {
    #[serde(default)]
    pub method: DepreciationMethod,
    #[serde(default = "default_life_years")]
    pub life_years: u32,
    #[serde(default = "default_declining_rate_pct")]
    pub declining_rate_pct: f64,
}

fn default_life_years() -> u32 { 5 }
fn default_declining_rate_pct() -> f64 { 30.0 }

impl Default for Depreciation {
    fn default() -> Self {
        Self {
            method: DepreciationMethod::None,
            life_years: default_life_years(),
            declining_rate_pct: default_declining_rate_pct(),
        }
    }
}

/// Recurring or one-off cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OtherCostKind {
    Annual {
        annual_amount: f64,
        /// Defaults to the first operating year
        #[serde(default)]
        start_year: Option<i32>,
        /// Defaults to the end of the horizon
        #[serde(default)]
        end_year: Option<i32>,
    },
    Capital {
        capital_amount: f64,
        /// Defaults to the base year (index 0)
        #[serde(default)]
        capital_year: Option<i32>,
        #[serde(default)]
        depreciation: Depreciation,
    },
}

/// A cost item charged to the project as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherCostItem {
    pub id: String,

    /// Free-form reporting category (e.g. "monitoring", "equipment")
    #[serde(default)]
    pub category: String,

    #[serde(flatten)]
    pub kind: OtherCostKind,

    /// Counts toward the constrained BCR denominator
    #[serde(default)]
    pub constrained: bool,
}

impl OtherCostItem {
    pub fn annual(id: &str, annual_amount: f64) -> Self {
        Self {
            id: id.to_string(),
            category: String::new(),
            kind: OtherCostKind::Annual {
                annual_amount,
                start_year: None,
                end_year: None,
            },
            constrained: false,
        }
    }

    pub fn capital(id: &str, capital_amount: f64, capital_year: i32) -> Self {
        Self {
            id: id.to_string(),
            category: String::new(),
            kind: OtherCostKind::Capital {
                capital_amount,
                capital_year: Some(capital_year),
                depreciation: Depreciation::default(),
            },
            constrained: false,
        }
    }

    pub fn between(mut self, start: i32, end: i32) -> Self {
        if let OtherCostKind::Annual { start_year, end_year, .. } = &mut self.kind {
            *start_year = Some(start);
            *end_year = Some(end);
        }
        self
    }

    pub fn depreciated(mut self, terms: Depreciation) -> Self {
        if let OtherCostKind::Capital { depreciation, .. } = &mut self.kind {
            *depreciation = terms;
        }
        self
    }

    pub fn constrained(mut self) -> Self {
        self.constrained = true;
        self
    }

    /// Scale the item's amount by `factor`
    pub fn scale(&mut self, factor: f64) {
        match &mut self.kind {
            OtherCostKind::Annual { annual_amount, .. } => *annual_amount *= factor,
            OtherCostKind::Capital { capital_amount, .. } => *capital_amount *= factor,
        }
    }

    /// Cash-flow postings `(index, amount)` for this item
    ///
    /// Annual amounts cover their window clipped to 1..=N. A capital amount
    /// lands at its year offset; offsets outside [0, N] are dropped.
    pub fn postings(&self, config: &ConfigurationContext) -> Vec<(usize, f64)> {
        match &self.kind {
            OtherCostKind::Annual {
                annual_amount,
                start_year,
                end_year,
            } => {
                let start = start_year.unwrap_or(config.base_year + 1);
                let end = end_year.unwrap_or(config.base_year + config.horizon_years as i32);
                (1..=config.horizon_years as usize)
                    .filter(|t| {
                        let year = config.base_year + *t as i32;
                        year >= start && year <= end
                    })
                    .map(|t| (t, *annual_amount))
                    .collect()
            }
            OtherCostKind::Capital {
                capital_amount,
                capital_year,
                ..
            } => {
                let year = capital_year.unwrap_or(config.base_year);
                match config.year_index(year) {
                    Some(idx) => vec![(idx, *capital_amount)],
                    None => {
                        log::debug!(
                            "capital cost '{}' in {} falls outside the horizon; dropped",
                            self.id,
                            year
                        );
                        Vec::new()
                    }
                }
            }
        }
    }
}
