//! Extra benefit items outside the treatment model
//!
//! Each category carries its own fields and accrual rule:
//! - C1/C2: unit value x quantity per year
//! - C3: unit value x abatement per year
//! - C4/C5/C8: flat annual amount
//! - C6: single lump amount at `once_year`
//! - C7: expected avoided loss, max(p0 - p1, 0) x consequence per year
//!
//! Growth compounding applies to C1-C5 and C8 from the item's start year.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigurationContext, Scenario};

/// Category-specific accrual rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum Accrual {
    C1 { unit_value: f64, quantity: f64 },
    C2 { unit_value: f64, quantity: f64 },
    C3 { unit_value: f64, abatement: f64 },
    C4 { annual_amount: f64 },
    C5 { annual_amount: f64 },
    C6 { annual_amount: f64 },
    C7 {
        baseline_probability: f64,
        project_probability: f64,
        consequence_value: f64,
    },
    C8 { annual_amount: f64 },
}

impl Accrual {
    /// Value accrued in one period before growth and scenario scaling
    pub fn base_value(&self) -> f64 {
        match self {
            Accrual::C1 { unit_value, quantity } | Accrual::C2 { unit_value, quantity } => {
                unit_value * quantity
            }
            Accrual::C3 { unit_value, abatement } => unit_value * abatement,
            Accrual::C4 { annual_amount }
            | Accrual::C5 { annual_amount }
            | Accrual::C6 { annual_amount }
            | Accrual::C8 { annual_amount } => *annual_amount,
            Accrual::C7 {
                baseline_probability,
                project_probability,
                consequence_value,
            } => (baseline_probability - project_probability).max(0.0) * consequence_value,
        }
    }

    /// Whether `growth_pct_per_year` compounds this category
    pub fn compounds(&self) -> bool {
        !matches!(self, Accrual::C6 { .. } | Accrual::C7 { .. })
    }

    /// C6 always posts a single lump
    pub fn is_lump(&self) -> bool {
        matches!(self, Accrual::C6 { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Accrual::C1 { .. } => "C1",
            Accrual::C2 { .. } => "C2",
            Accrual::C3 { .. } => "C3",
            Accrual::C4 { .. } => "C4",
            Accrual::C5 { .. } => "C5",
            Accrual::C6 { .. } => "C6",
            Accrual::C7 { .. } => "C7",
            Accrual::C8 { .. } => "C8",
        }
    }
}

/// Recurrence of a benefit item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Annual,
    Once,
}

/// A benefit accruing outside the per-treatment output model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitItem {
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(flatten)]
    pub accrual: Accrual,

    #[serde(default)]
    pub frequency: Frequency,

    /// First calendar year of accrual; defaults to the first operating year
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Last calendar year of accrual; defaults to the end of the horizon
    #[serde(default)]
    pub end_year: Option<i32>,

    /// Calendar year of a lump posting; defaults to `start_year`, then base year
    #[serde(default)]
    pub once_year: Option<i32>,

    #[serde(default)]
    pub growth_pct_per_year: f64,

    #[serde(default)]
    pub link_to_adoption: bool,

    #[serde(default)]
    pub link_to_risk: bool,
}

impl BenefitItem {
    pub fn new(id: &str, accrual: Accrual) -> Self {
        Self {
            id: id.to_string(),
            label: String::new(),
            accrual,
            frequency: Frequency::Annual,
            start_year: None,
            end_year: None,
            once_year: None,
            growth_pct_per_year: 0.0,
            link_to_adoption: false,
            link_to_risk: false,
        }
    }

    pub fn once_at(mut self, year: i32) -> Self {
        self.frequency = Frequency::Once;
        self.once_year = Some(year);
        self
    }

    pub fn between(mut self, start_year: i32, end_year: i32) -> Self {
        self.start_year = Some(start_year);
        self.end_year = Some(end_year);
        self
    }

    pub fn with_growth(mut self, pct_per_year: f64) -> Self {
        self.growth_pct_per_year = pct_per_year;
        self
    }

    pub fn linked(mut self, adoption: bool, risk: bool) -> Self {
        self.link_to_adoption = adoption;
        self.link_to_risk = risk;
        self
    }

    /// Posts as a single lump rather than annually
    pub fn is_once(&self) -> bool {
        self.frequency == Frequency::Once || self.accrual.is_lump()
    }

    /// Scenario scaling for linked items
    pub fn scenario_factor(&self, scenario: &Scenario) -> f64 {
        let mut factor = 1.0;
        if self.link_to_risk {
            factor *= 1.0 - scenario.risk;
        }
        if self.link_to_adoption {
            factor *= scenario.adoption;
        }
        factor
    }

    /// Cash-flow postings `(index, amount)` for this item
    ///
    /// Annual items land on indices 1..=N inside their window. Lumps land at
    /// their year's offset from the base year, and are dropped if that offset
    /// falls outside [0, N].
    pub fn postings(
        &self,
        config: &ConfigurationContext,
        scenario: &Scenario,
    ) -> Vec<(usize, f64)> {
        let value = self.accrual.base_value();

        if self.is_once() {
            let year = self
                .once_year
                .or(self.start_year)
                .unwrap_or(config.base_year);
            return match config.year_index(year) {
                Some(idx) => vec![(idx, value)],
                None => {
                    log::debug!(
                        "benefit '{}' lump in {} falls outside the horizon; dropped",
                        self.id,
                        year
                    );
                    Vec::new()
                }
            };
        }

        let first_year = config.base_year + 1;
        let start = self.start_year.unwrap_or(first_year);
        let end = self
            .end_year
            .unwrap_or(config.base_year + config.horizon_years as i32);
        let factor = self.scenario_factor(scenario);
        let growth = if self.accrual.compounds() {
            1.0 + self.growth_pct_per_year / 100.0
        } else {
            1.0
        };

        (1..=config.horizon_years as usize)
            .filter_map(|t| {
                let year = config.base_year + t as i32;
                if year < start || year > end {
                    return None;
                }
                let elapsed = (year - start).max(0);
                Some((t, value * growth.powi(elapsed) * factor))
            })
            .collect()
    }
}
