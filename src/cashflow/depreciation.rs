//! Depreciation schedules for capital cost items
//!
//! Reporting only: schedules are derived from capital items but never feed
//! back into the cash-flow series.

use serde::{Deserialize, Serialize};

use crate::config::ConfigurationContext;
use crate::model::{DepreciationMethod, OtherCostItem, OtherCostKind};

/// One year of a depreciation schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationRow {
    /// Cash-flow index the charge belongs to
    pub year_index: usize,
    pub charge: f64,
    pub closing_book_value: f64,
}

/// Named schedule for one capital item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub item_id: String,
    pub method: DepreciationMethod,
    pub rows: Vec<DepreciationRow>,
}

/// Book value below which a declining-balance schedule is treated as exhausted
const BOOK_VALUE_FLOOR: f64 = 1e-9;

/// Schedule for a capital item, or `None` for annual items, items without a
/// depreciation method, or capital falling outside the horizon
///
/// Charges start in the capital year and run for `life_years`, truncated at
/// the end of the horizon.
pub fn depreciation_schedule(
    item: &OtherCostItem,
    config: &ConfigurationContext,
) -> Option<DepreciationSchedule> {
    let OtherCostKind::Capital {
        capital_amount,
        capital_year,
        depreciation,
    } = &item.kind
    else {
        return None;
    };
    if depreciation.method == DepreciationMethod::None || depreciation.life_years == 0 {
        return None;
    }
    let start = config.year_index(capital_year.unwrap_or(config.base_year))?;
    let last = (start + depreciation.life_years as usize - 1).min(config.horizon_years as usize);

    let mut rows = Vec::with_capacity(last + 1 - start);
    let mut book = *capital_amount;

    match depreciation.method {
        DepreciationMethod::StraightLine => {
            let charge = capital_amount / depreciation.life_years as f64;
            for year_index in start..=last {
                book -= charge;
                rows.push(DepreciationRow {
                    year_index,
                    charge,
                    closing_book_value: book.max(0.0),
                });
            }
        }
        DepreciationMethod::DecliningBalance => {
            let rate = (depreciation.declining_rate_pct / 100.0).clamp(0.0, 1.0);
            for year_index in start..=last {
                if book <= BOOK_VALUE_FLOOR {
                    break;
                }
                let charge = book * rate;
                book -= charge;
                rows.push(DepreciationRow {
                    year_index,
                    charge,
                    closing_book_value: book,
                });
            }
        }
        DepreciationMethod::None => return None,
    }

    Some(DepreciationSchedule {
        item_id: item.id.clone(),
        method: depreciation.method,
        rows,
    })
}

/// Schedules for every depreciable item in a ledger
pub fn depreciation_schedules(
    items: &[OtherCostItem],
    config: &ConfigurationContext,
) -> Vec<DepreciationSchedule> {
    items
        .iter()
        .filter_map(|item| depreciation_schedule(item, config))
        .collect()
}
