//! Synthetic trial generator
//!
//! Builds a reproducible request from a fixed table of treatment packages:
//! - Control plus up to eight alternative input packages
//! - Output prices and area scaled by parameters
//! - Optional project-level benefit and cost ledgers

use serde::{Deserialize, Serialize};

use super::{
    Accrual, BenefitItem, Depreciation, DepreciationMethod, EvaluationRequest, OtherCostItem,
    OutputCatalog, OutputDefinition, Treatment,
};
use crate::config::{ConfigurationContext, DEFAULT_BASE_YEAR};

/// Parameters for generating a trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialParams {
    /// Number of non-control treatments (capped at the template size)
    #[serde(default = "default_alternatives")]
    pub alternatives: usize,

    /// Area per treatment in hectares
    #[serde(default = "default_area")]
    pub area_ha: f64,

    /// Multiplier on template output prices (1.0 = no change)
    #[serde(default = "default_one")]
    pub price_mult: f64,

    /// Multiplier on template per-hectare costs (1.0 = no change)
    #[serde(default = "default_one")]
    pub cost_mult: f64,

    /// Add the template's extra benefit and other-cost items
    #[serde(default = "default_true")]
    pub with_ledgers: bool,

    #[serde(default = "default_horizon")]
    pub horizon_years: u32,

    #[serde(default = "default_base_year")]
    pub base_year: i32,
}

fn default_alternatives() -> usize { 4 }
fn default_area() -> f64 { 100.0 }
fn default_one() -> f64 { 1.0 }
fn default_true() -> bool { true }
fn default_horizon() -> u32 { 10 }
fn default_base_year() -> i32 { DEFAULT_BASE_YEAR }

impl Default for TrialParams {
    fn default() -> Self {
        Self {
            alternatives: default_alternatives(),
            area_ha: default_area(),
            price_mult: 1.0,
            cost_mult: 1.0,
            with_ledgers: true,
            horizon_years: default_horizon(),
            base_year: default_base_year(),
        }
    }
}

/// One input package in the template table
#[derive(Debug, Clone)]
struct PackageCell {
    id: &'static str,
    name: &'static str,
    /// Grain yield change, t/ha
    yield_delta: f64,
    /// Protein premium change, t/ha of premium-grade grain
    protein_delta: f64,
    materials: f64,
    services: f64,
    labour: f64,
    capital: f64,
    constrained: bool,
}

/// Pre-built template for generating trials
pub struct TrialTemplate {
    control: PackageCell,
    packages: Vec<PackageCell>,
}

impl TrialTemplate {
    pub fn new() -> Self {
        Self {
            control: PackageCell {
                id: "control",
                name: "Farmer practice",
                yield_delta: 0.0,
                protein_delta: 0.0,
                materials: 0.0,
                services: 0.0,
                labour: 0.0,
                capital: 0.0,
                constrained: false,
            },
            packages: build_packages(),
        }
    }

    /// Generate a request based on parameters
    pub fn generate(&self, params: &TrialParams) -> EvaluationRequest {
        let outputs = OutputCatalog::new(vec![
            OutputDefinition::new("grain_yield", "Grain yield", "t/ha", 320.0 * params.price_mult),
            OutputDefinition::new("protein", "Protein premium", "t/ha", 45.0 * params.price_mult),
        ]);

        let count = params.alternatives.min(self.packages.len());
        let mut treatments = Vec::with_capacity(count + 1);
        treatments.push(self.build_treatment(&self.control, params).control());
        for cell in self.packages.iter().take(count) {
            treatments.push(self.build_treatment(cell, params));
        }

        let config = ConfigurationContext {
            horizon_years: params.horizon_years,
            base_year: params.base_year,
            ..Default::default()
        };

        let mut request = EvaluationRequest::new(outputs, treatments, config);
        if params.with_ledgers {
            request.benefits = build_benefits(params.base_year);
            request.other_costs = build_other_costs(params.base_year);
        }
        request
    }

    fn build_treatment(&self, cell: &PackageCell, params: &TrialParams) -> Treatment {
        let mut t = Treatment::new(cell.id, cell.name, params.area_ha)
            .with_delta("grain_yield", cell.yield_delta)
            .with_delta("protein", cell.protein_delta)
            .with_costs(
                cell.materials * params.cost_mult,
                cell.services * params.cost_mult,
                cell.labour * params.cost_mult,
            )
            .with_capital(cell.capital * params.cost_mult);
        t.constrained = cell.constrained;
        t
    }
}

impl Default for TrialTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Template input packages, roughly ordered by intensity
fn build_packages() -> Vec<PackageCell> {
    vec![
        PackageCell {
            id: "lime",
            name: "Lime 2.5 t/ha",
            yield_delta: 0.35,
            protein_delta: 0.0,
            materials: 55.0,
            services: 12.0,
            labour: 4.0,
            capital: 0.0,
            constrained: true,
        },
        PackageCell {
            id: "deep_rip",
            name: "Deep ripping",
            yield_delta: 0.55,
            protein_delta: 0.1,
            materials: 0.0,
            services: 60.0,
            labour: 8.0,
            capital: 4_000.0,
            constrained: true,
        },
        PackageCell {
            id: "gypsum",
            name: "Gypsum 3 t/ha",
            yield_delta: 0.25,
            protein_delta: 0.05,
            materials: 70.0,
            services: 10.0,
            labour: 4.0,
            capital: 0.0,
            constrained: true,
        },
        PackageCell {
            id: "organic",
            name: "Organic amendment",
            yield_delta: 0.40,
            protein_delta: 0.2,
            materials: 95.0,
            services: 20.0,
            labour: 10.0,
            capital: 0.0,
            constrained: false,
        },
        PackageCell {
            id: "n_split",
            name: "Split nitrogen",
            yield_delta: 0.30,
            protein_delta: 0.4,
            materials: 48.0,
            services: 6.0,
            labour: 6.0,
            capital: 0.0,
            constrained: false,
        },
        PackageCell {
            id: "clay",
            name: "Clay spreading",
            yield_delta: 0.60,
            protein_delta: 0.0,
            materials: 0.0,
            services: 90.0,
            labour: 12.0,
            capital: 9_000.0,
            constrained: true,
        },
        PackageCell {
            id: "cover",
            name: "Cover crop",
            yield_delta: 0.15,
            protein_delta: 0.1,
            materials: 30.0,
            services: 8.0,
            labour: 10.0,
            capital: 0.0,
            constrained: false,
        },
        PackageCell {
            id: "combo",
            name: "Lime + ripping",
            yield_delta: 0.75,
            protein_delta: 0.1,
            materials: 55.0,
            services: 72.0,
            labour: 12.0,
            capital: 4_000.0,
            constrained: true,
        },
    ]
}

fn build_benefits(base_year: i32) -> Vec<BenefitItem> {
    vec![
        BenefitItem::new("erosion", Accrual::C3 { unit_value: 25.0, abatement: 40.0 })
            .linked(true, true)
            .with_growth(2.0),
        BenefitItem::new("frost_loss", Accrual::C7 {
            baseline_probability: 0.20,
            project_probability: 0.12,
            consequence_value: 15_000.0,
        })
        .linked(false, true),
        BenefitItem::new("salvage", Accrual::C6 { annual_amount: 2_500.0 }).once_at(base_year + 10),
    ]
}

fn build_other_costs(base_year: i32) -> Vec<OtherCostItem> {
    vec![
        OtherCostItem::annual("monitoring", 1_200.0).constrained(),
        OtherCostItem::capital("spreader", 18_000.0, base_year).depreciated(Depreciation {
            method: DepreciationMethod::StraightLine,
            life_years: 8,
            declining_rate_pct: 0.0,
        }),
    ]
}
