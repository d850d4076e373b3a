//! Run configuration: horizon, scenario ranges, MIRR rates, simulation and
//! sensitivity settings

mod scenario;

pub use scenario::{Scenario, ScenarioTriple};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Which cost track forms the BCR denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcrDenominator {
    /// All discounted costs
    #[default]
    Total,
    /// Only costs flagged `constrained`
    Constrained,
}

/// Finance and reinvestment rates for MIRR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirrRates {
    /// Rate charged on negative flows, percent
    pub finance_rate_pct: f64,
    /// Rate earned on positive flows, percent
    pub reinvestment_rate_pct: f64,
}

impl Default for MirrRates {
    fn default() -> Self {
        Self {
            finance_rate_pct: 6.0,      // 6% borrowing cost
            reinvestment_rate_pct: 4.0, // 4% reinvestment
        }
    }
}

/// Input categories that receive multiplicative shocks during simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaryFlags {
    #[serde(default)]
    pub prices: bool,
    #[serde(default)]
    pub treatment_costs: bool,
    #[serde(default)]
    pub other_costs: bool,
}

impl VaryFlags {
    pub const fn all() -> Self {
        Self {
            prices: true,
            treatment_costs: true,
            other_costs: true,
        }
    }

    pub fn any(&self) -> bool {
        self.prices || self.treatment_costs || self.other_costs
    }
}

/// Monte Carlo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    #[serde(default = "default_run_count")]
    pub run_count: usize,

    /// Seed for the generator; `None` draws a fresh seed per run
    #[serde(default)]
    pub seed: Option<u32>,

    /// Half-width of the uniform shock band in percent (10.0 = +/-10%)
    #[serde(default = "default_variation_pct")]
    pub variation_pct: f64,

    #[serde(default)]
    pub vary: VaryFlags,

    /// BCR threshold reported alongside P(BCR > 1)
    #[serde(default = "default_bcr_target")]
    pub bcr_target: f64,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Iterations between progress callbacks
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_run_count() -> usize { 1000 }
fn default_variation_pct() -> f64 { 10.0 }
fn default_bcr_target() -> f64 { 1.5 }
fn default_histogram_bins() -> usize { 20 }
fn default_batch_size() -> usize { 500 }

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            run_count: default_run_count(),
            seed: None,
            variation_pct: default_variation_pct(),
            vary: VaryFlags::default(),
            bcr_target: default_bcr_target(),
            histogram_bins: default_histogram_bins(),
            batch_size: default_batch_size(),
        }
    }
}

/// Axes of the deterministic sensitivity grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAxes {
    /// Discount rates in percent
    pub discount_rates_pct: Vec<f64>,
    pub price_multipliers: Vec<f64>,
}

impl Default for SensitivityAxes {
    fn default() -> Self {
        Self {
            discount_rates_pct: vec![4.0, 7.0, 10.0],
            price_multipliers: vec![0.8, 0.9, 1.0, 1.1, 1.2],
        }
    }
}

/// Immutable-per-run configuration bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationContext {
    /// Number of operating years N; cash-flow series have N + 1 entries
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Calendar year mapped to cash-flow index 0; required in serialized
    /// requests so item years never depend on when the request is evaluated
    pub base_year: i32,

    /// Discount rate scenarios in percent
    #[serde(default = "default_discount_rates")]
    pub discount_rate_pct: ScenarioTriple,

    /// Adoption scenarios as fractions
    #[serde(default = "default_adoption")]
    pub adoption: ScenarioTriple,

    /// Risk derating scenarios as fractions
    #[serde(default = "default_risk")]
    pub risk: ScenarioTriple,

    #[serde(default)]
    pub mirr: MirrRates,

    #[serde(default)]
    pub bcr_denominator: BcrDenominator,

    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,

    #[serde(default)]
    pub sensitivity: SensitivityAxes,
}

/// Base year used by `Default`; programmatic callers normally override it
pub const DEFAULT_BASE_YEAR: i32 = 2025;

fn default_horizon_years() -> u32 { 10 }
fn default_discount_rates() -> ScenarioTriple { ScenarioTriple::new(4.0, 7.0, 10.0) }
fn default_adoption() -> ScenarioTriple { ScenarioTriple::new(0.6, 0.8, 1.0) }
fn default_risk() -> ScenarioTriple { ScenarioTriple::new(0.05, 0.15, 0.30) }

impl Default for ConfigurationContext {
    fn default() -> Self {
        Self {
            horizon_years: default_horizon_years(),
            base_year: DEFAULT_BASE_YEAR,
            discount_rate_pct: default_discount_rates(),
            adoption: default_adoption(),
            risk: default_risk(),
            mirr: MirrRates::default(),
            bcr_denominator: BcrDenominator::default(),
            monte_carlo: MonteCarloConfig::default(),
            sensitivity: SensitivityAxes::default(),
        }
    }
}

impl ConfigurationContext {
    /// Scenario built from the base value of every triple
    pub fn base_scenario(&self) -> Scenario {
        Scenario::new(self.discount_rate_pct.base, self.adoption.base, self.risk.base)
    }

    /// Number of entries in every cash-flow series
    pub fn series_len(&self) -> usize {
        self.horizon_years as usize + 1
    }

    /// Map a calendar year onto a cash-flow index, if it falls inside [0, N]
    pub fn year_index(&self, year: i32) -> Option<usize> {
        let offset = i64::from(year) - i64::from(self.base_year);
        if offset < 0 || offset > i64::from(self.horizon_years) {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// Reject out-of-range settings
    ///
    /// A zero horizon is not rejected here; the pipeline reports it as a
    /// degenerate input instead.
    pub fn validate(&self) -> EngineResult<()> {
        self.discount_rate_pct.validate("discount_rate_pct")?;
        if self.discount_rate_pct.low <= -100.0 {
            return Err(EngineError::invalid(
                "discount_rate_pct",
                "rates must be above -100%",
            ));
        }
        self.adoption.validate_fraction("adoption")?;
        self.risk.validate_fraction("risk")?;

        for (field, rate) in [
            ("mirr.finance_rate_pct", self.mirr.finance_rate_pct),
            ("mirr.reinvestment_rate_pct", self.mirr.reinvestment_rate_pct),
        ] {
            if !rate.is_finite() || rate <= -100.0 {
                return Err(EngineError::invalid(field, "rate must be finite and above -100%"));
            }
        }

        let mc = &self.monte_carlo;
        if !mc.variation_pct.is_finite() || mc.variation_pct < 0.0 || mc.variation_pct > 100.0 {
            return Err(EngineError::invalid(
                "monte_carlo.variation_pct",
                "must lie in [0, 100]",
            ));
        }
        if mc.histogram_bins == 0 {
            return Err(EngineError::invalid("monte_carlo.histogram_bins", "must be positive"));
        }
        if mc.batch_size == 0 {
            return Err(EngineError::invalid("monte_carlo.batch_size", "must be positive"));
        }
        if !mc.bcr_target.is_finite() {
            return Err(EngineError::invalid("monte_carlo.bcr_target", "must be finite"));
        }

        if self.sensitivity.discount_rates_pct.iter().any(|r| !r.is_finite() || *r <= -100.0) {
            return Err(EngineError::invalid(
                "sensitivity.discount_rates_pct",
                "rates must be finite and above -100%",
            ));
        }
        if self.sensitivity.price_multipliers.iter().any(|m| !m.is_finite()) {
            return Err(EngineError::invalid(
                "sensitivity.price_multipliers",
                "multipliers must be finite",
            ));
        }
        Ok(())
    }
}
