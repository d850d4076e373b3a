//! Input records: outputs, treatments, benefit and cost ledgers

pub mod adjuster;
mod benefit;
mod cost;
pub mod generator;
mod output;
mod request;
mod treatment;

pub use adjuster::{adjusted_copy, AdjustmentParams};
pub use benefit::{Accrual, BenefitItem, Frequency};
pub use cost::{Depreciation, DepreciationMethod, OtherCostItem, OtherCostKind};
pub use generator::{TrialParams, TrialTemplate};
pub use output::{OutputCatalog, OutputDefinition};
pub use request::{DegenerateInput, EvaluationRequest};
pub use treatment::Treatment;
