//! Scenario triples and the concrete scenario an evaluation runs under

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Low / base / high values for one uncertain parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTriple {
    pub low: f64,
    pub base: f64,
    pub high: f64,
}

impl ScenarioTriple {
    pub const fn new(low: f64, base: f64, high: f64) -> Self {
        Self { low, base, high }
    }

    /// Triple collapsed onto a single value
    pub const fn fixed(value: f64) -> Self {
        Self {
            low: value,
            base: value,
            high: value,
        }
    }

    /// Check ordering and finiteness
    pub fn validate(&self, field: &'static str) -> EngineResult<()> {
        if !(self.low.is_finite() && self.base.is_finite() && self.high.is_finite()) {
            return Err(EngineError::invalid(field, "values must be finite"));
        }
        if self.low > self.base || self.base > self.high {
            return Err(EngineError::invalid(
                field,
                format!(
                    "expected low <= base <= high, got ({}, {}, {})",
                    self.low, self.base, self.high
                ),
            ));
        }
        Ok(())
    }

    /// Check that all three values are fractions in [0, 1]
    pub fn validate_fraction(&self, field: &'static str) -> EngineResult<()> {
        self.validate(field)?;
        if self.low < 0.0 || self.high > 1.0 {
            return Err(EngineError::invalid(field, "fractions must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Concrete parameter set for one evaluation
///
/// Discount rate is only consumed by the metrics; adoption, risk and the price
/// multiplier shape the cash flows themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Annual discount rate in percent (7.0 = 7%)
    pub discount_rate_pct: f64,
    /// Fraction of potential benefit realised (0..=1)
    pub adoption: f64,
    /// Fraction by which benefits are derated for outcome risk (0..=1)
    pub risk: f64,
    /// Multiplier applied to every output unit price
    pub price_multiplier: f64,
}

impl Scenario {
    pub fn new(discount_rate_pct: f64, adoption: f64, risk: f64) -> Self {
        Self {
            discount_rate_pct,
            adoption,
            risk,
            price_multiplier: 1.0,
        }
    }

    pub fn with_price_multiplier(mut self, multiplier: f64) -> Self {
        self.price_multiplier = multiplier;
        self
    }

    pub fn with_discount_rate(mut self, rate_pct: f64) -> Self {
        self.discount_rate_pct = rate_pct;
        self
    }

    /// Benefit scaling for flows linked to both adoption and risk
    pub fn benefit_factor(&self) -> f64 {
        (1.0 - self.risk) * self.adoption
    }
}
