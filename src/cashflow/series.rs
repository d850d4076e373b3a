//! Year-indexed benefit and cost arrays

use serde::{Deserialize, Serialize};

/// Benefit and cost streams over indices 0..=N
///
/// Index 0 is year zero (capital outlays); 1..=N are operating years. The
/// constrained track holds the subset of costs flagged `constrained`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSeries {
    pub benefit_by_year: Vec<f64>,
    pub cost_by_year: Vec<f64>,
    pub constrained_cost_by_year: Vec<f64>,
}

impl CashflowSeries {
    /// All-zero series with `len` entries
    pub fn zeros(len: usize) -> Self {
        Self {
            benefit_by_year: vec![0.0; len],
            cost_by_year: vec![0.0; len],
            constrained_cost_by_year: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.benefit_by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benefit_by_year.is_empty()
    }

    /// Number of operating years N
    pub fn horizon(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn add_benefit(&mut self, index: usize, amount: f64) {
        if let Some(slot) = self.benefit_by_year.get_mut(index) {
            *slot += amount;
        }
    }

    pub fn add_cost(&mut self, index: usize, amount: f64, constrained: bool) {
        if let Some(slot) = self.cost_by_year.get_mut(index) {
            *slot += amount;
            if constrained {
                self.constrained_cost_by_year[index] += amount;
            }
        }
    }

    /// Element-wise sum with another series of the same length
    pub fn accumulate(&mut self, other: &CashflowSeries) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.benefit_by_year.iter_mut().zip(&other.benefit_by_year) {
            *a += b;
        }
        for (a, b) in self.cost_by_year.iter_mut().zip(&other.cost_by_year) {
            *a += b;
        }
        for (a, b) in self
            .constrained_cost_by_year
            .iter_mut()
            .zip(&other.constrained_cost_by_year)
        {
            *a += b;
        }
    }

    /// Net flow per year: benefit minus cost
    pub fn net(&self) -> Vec<f64> {
        self.benefit_by_year
            .iter()
            .zip(&self.cost_by_year)
            .map(|(b, c)| b - c)
            .collect()
    }

    pub fn total_benefit(&self) -> f64 {
        self.benefit_by_year.iter().sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.cost_by_year.iter().sum()
    }
}
