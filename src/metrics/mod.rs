//! Discounted investment-appraisal metrics
//!
//! Ratios that need a positive denominator, a sign change, or a bracketed
//! root are `Option<f64>`: `None` means undefined, never zero or infinity.

mod irr;
mod mirr;
mod payback;

pub use irr::{has_sign_change, irr_pct, npv_at};
pub use mirr::mirr_pct;
pub use payback::{payback_year, Payback};

use serde::{Deserialize, Serialize};

use crate::cashflow::CashflowSeries;
use crate::config::{BcrDenominator, ConfigurationContext};

/// Discount factor 1 / (1 + r)^t for a percentage rate
pub fn discount_factor(rate_pct: f64, t: usize) -> f64 {
    1.0 / (1.0 + rate_pct / 100.0).powi(t as i32)
}

/// Sum of `series[t] / (1 + r)^t` over every index
pub fn present_value(series: &[f64], rate_pct: f64) -> f64 {
    series
        .iter()
        .enumerate()
        .map(|(t, v)| v * discount_factor(rate_pct, t))
        .sum()
}

/// Ratio defined only for a strictly positive denominator
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        let r = numerator / denominator;
        r.is_finite().then_some(r)
    } else {
        None
    }
}

/// Indicators for one cash-flow series at one discount rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub discount_rate_pct: f64,
    pub pv_benefits: f64,
    pub pv_costs: f64,
    pub pv_costs_constrained: f64,
    pub npv: f64,
    pub bcr: Option<f64>,
    pub irr_pct: Option<f64>,
    pub mirr_pct: Option<f64>,
    pub roi_pct: Option<f64>,
    pub payback: Payback,
}

impl EvaluationResult {
    /// NPV if it is a finite number
    pub fn finite_npv(&self) -> Option<f64> {
        self.npv.is_finite().then_some(self.npv)
    }
}

/// Evaluate a series at `rate_pct` with the configured BCR denominator and MIRR rates
pub fn evaluate_series(
    series: &CashflowSeries,
    rate_pct: f64,
    config: &ConfigurationContext,
) -> EvaluationResult {
    let pv_benefits = present_value(&series.benefit_by_year, rate_pct);
    let pv_costs = present_value(&series.cost_by_year, rate_pct);
    let pv_costs_constrained = present_value(&series.constrained_cost_by_year, rate_pct);
    let npv = pv_benefits - pv_costs;

    let denominator = match config.bcr_denominator {
        BcrDenominator::Total => pv_costs,
        BcrDenominator::Constrained => pv_costs_constrained,
    };
    let net = series.net();

    EvaluationResult {
        discount_rate_pct: rate_pct,
        pv_benefits,
        pv_costs,
        pv_costs_constrained,
        npv,
        bcr: ratio(pv_benefits, denominator),
        irr_pct: irr_pct(&net),
        mirr_pct: mirr_pct(
            &net,
            config.mirr.finance_rate_pct,
            config.mirr.reinvestment_rate_pct,
        ),
        roi_pct: ratio(npv, pv_costs).map(|r| r * 100.0),
        payback: payback_year(&net, rate_pct),
    }
}
