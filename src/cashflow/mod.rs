//! Cash-flow construction for treatments, ledgers and the whole project

mod builder;
mod depreciation;
mod series;

pub use builder::CashflowBuilder;
pub use depreciation::{
    depreciation_schedule, depreciation_schedules, DepreciationRow, DepreciationSchedule,
};
pub use series::CashflowSeries;
