//! Treatment records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One trial treatment: an input package applied over an area
///
/// Deltas are per-hectare changes in each output relative to no treatment.
/// Costs are per hectare except `capital_cost`, which is a one-off amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: String,
    pub name: String,

    pub area_ha: f64,

    #[serde(default)]
    pub is_control: bool,

    /// Output id -> quantity change per hectare
    #[serde(default)]
    pub deltas: BTreeMap<String, f64>,

    #[serde(default)]
    pub materials_cost_per_ha: f64,
    #[serde(default)]
    pub services_cost_per_ha: f64,
    #[serde(default)]
    pub labour_cost_per_ha: f64,

    /// One-off cost posted at year zero
    #[serde(default)]
    pub capital_cost: f64,

    /// Costs count toward the constrained BCR denominator
    #[serde(default)]
    pub constrained: bool,
}

impl Treatment {
    pub fn new(id: &str, name: &str, area_ha: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            area_ha,
            is_control: false,
            deltas: BTreeMap::new(),
            materials_cost_per_ha: 0.0,
            services_cost_per_ha: 0.0,
            labour_cost_per_ha: 0.0,
            capital_cost: 0.0,
            constrained: false,
        }
    }

    pub fn control(mut self) -> Self {
        self.is_control = true;
        self
    }

    pub fn with_delta(mut self, output_id: &str, per_ha: f64) -> Self {
        self.deltas.insert(output_id.to_string(), per_ha);
        self
    }

    pub fn with_costs(mut self, materials: f64, services: f64, labour: f64) -> Self {
        self.materials_cost_per_ha = materials;
        self.services_cost_per_ha = services;
        self.labour_cost_per_ha = labour;
        self
    }

    pub fn with_capital(mut self, capital_cost: f64) -> Self {
        self.capital_cost = capital_cost;
        self
    }

    pub fn constrained(mut self) -> Self {
        self.constrained = true;
        self
    }

    /// Recurring cost per hectare
    pub fn cost_per_ha(&self) -> f64 {
        self.materials_cost_per_ha + self.services_cost_per_ha + self.labour_cost_per_ha
    }

    /// Recurring cost over the whole area
    pub fn annual_cost(&self) -> f64 {
        self.cost_per_ha() * self.area_ha
    }

    /// Scale every cost component by `factor`
    pub fn scale_costs(&mut self, factor: f64) {
        self.materials_cost_per_ha *= factor;
        self.services_cost_per_ha *= factor;
        self.labour_cost_per_ha *= factor;
        self.capital_cost *= factor;
    }
}
