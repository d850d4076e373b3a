//! Multiplicative input adjustments applied to a copy of the request
//!
//! Simulation shocks never touch the caller's request: the adjuster clones the
//! model, scales the copy, and the copy is dropped after evaluation.

use super::EvaluationRequest;

/// Per-item multipliers for one adjusted copy
///
/// Empty vectors leave that input category untouched. Non-empty vectors must
/// match the length of the corresponding input list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentParams {
    /// One multiplier per output, in catalog order
    pub price_mult: Vec<f64>,
    /// One multiplier per treatment, applied to all of its cost components
    pub treatment_cost_mult: Vec<f64>,
    /// One multiplier per other-cost item
    pub other_cost_mult: Vec<f64>,
}

impl AdjustmentParams {
    /// No multipliers set or every multiplier equal to 1
    pub fn is_identity(&self) -> bool {
        self.price_mult
            .iter()
            .chain(&self.treatment_cost_mult)
            .chain(&self.other_cost_mult)
            .all(|m| (*m - 1.0).abs() < 1e-15)
    }
}

/// Clone `base` and apply the multipliers to the copy
pub fn adjusted_copy(base: &EvaluationRequest, params: &AdjustmentParams) -> EvaluationRequest {
    let mut adjusted = base.clone();
    if params.is_identity() {
        return adjusted;
    }

    if !params.price_mult.is_empty() {
        debug_assert_eq!(params.price_mult.len(), adjusted.outputs.len());
        for (output, mult) in adjusted.outputs.iter_mut().zip(&params.price_mult) {
            output.price_per_unit *= mult;
        }
    }

    if !params.treatment_cost_mult.is_empty() {
        debug_assert_eq!(params.treatment_cost_mult.len(), adjusted.treatments.len());
        for (treatment, mult) in adjusted.treatments.iter_mut().zip(&params.treatment_cost_mult) {
            treatment.scale_costs(*mult);
        }
    }

    if !params.other_cost_mult.is_empty() {
        debug_assert_eq!(params.other_cost_mult.len(), adjusted.other_costs.len());
        for (item, mult) in adjusted.other_costs.iter_mut().zip(&params.other_cost_mult) {
            item.scale(*mult);
        }
    }

    adjusted
}
