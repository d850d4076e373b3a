//! The complete input bundle for one appraisal run

use serde::{Deserialize, Serialize};

use super::{BenefitItem, OtherCostItem, OtherCostKind, OutputCatalog, Treatment};
use crate::config::ConfigurationContext;
use crate::error::{EngineError, EngineResult};

/// Reason an appraisal produced no results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateInput {
    NoTreatments,
    ZeroHorizon,
    /// Every flow starts after the final horizon year
    HorizonBeforeFirstAccrual,
}

/// Everything the engine needs, passed by value into pure functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub outputs: OutputCatalog,
    pub treatments: Vec<Treatment>,
    #[serde(default)]
    pub benefits: Vec<BenefitItem>,
    #[serde(default)]
    pub other_costs: Vec<OtherCostItem>,
    pub config: ConfigurationContext,
    /// Explicit control designation; overrides a single `is_control` flag
    #[serde(default)]
    pub control_id: Option<String>,
}

impl EvaluationRequest {
    pub fn new(
        outputs: OutputCatalog,
        treatments: Vec<Treatment>,
        config: ConfigurationContext,
    ) -> Self {
        Self {
            outputs,
            treatments,
            benefits: Vec::new(),
            other_costs: Vec::new(),
            config,
            control_id: None,
        }
    }

    /// Check required input: config ranges, catalog, ids and output references
    pub fn validate(&self) -> EngineResult<()> {
        self.config.validate()?;
        self.outputs.validate()?;

        for (i, t) in self.treatments.iter().enumerate() {
            if self.treatments[..i].iter().any(|o| o.id == t.id) {
                return Err(EngineError::DuplicateId {
                    kind: "treatment",
                    id: t.id.clone(),
                });
            }
            if let Some(missing) = t.deltas.keys().find(|k| self.outputs.get(k).is_none()) {
                return Err(EngineError::UnknownOutput {
                    treatment: t.id.clone(),
                    output: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Inputs that cannot produce any result
    pub fn degeneracy(&self) -> Option<DegenerateInput> {
        if self.treatments.is_empty() {
            return Some(DegenerateInput::NoTreatments);
        }
        if self.config.horizon_years == 0 {
            return Some(DegenerateInput::ZeroHorizon);
        }
        match self.earliest_accrual_year() {
            Some(year) if year > self.config.base_year + self.config.horizon_years as i32 => {
                Some(DegenerateInput::HorizonBeforeFirstAccrual)
            }
            _ => None,
        }
    }

    /// Calendar year of the first possible flow, ignoring treatments with
    /// neither area nor capital
    fn earliest_accrual_year(&self) -> Option<i32> {
        let base = self.config.base_year;
        let treatments = self.treatments.iter().filter_map(|t| {
            if t.capital_cost != 0.0 {
                Some(base)
            } else if t.area_ha != 0.0 {
                Some(base + 1)
            } else {
                None
            }
        });
        let benefits = self.benefits.iter().map(|b| {
            if b.is_once() {
                b.once_year.or(b.start_year).unwrap_or(base)
            } else {
                b.start_year.unwrap_or(base + 1).max(base + 1)
            }
        });
        let costs = self.other_costs.iter().map(|c| match &c.kind {
            OtherCostKind::Annual { start_year, .. } => {
                start_year.unwrap_or(base + 1).max(base + 1)
            }
            OtherCostKind::Capital { capital_year, .. } => capital_year.unwrap_or(base),
        });
        treatments.chain(benefits).chain(costs).min()
    }

    /// Resolve the control treatment, failing on missing or ambiguous designation
    pub fn control(&self) -> EngineResult<&Treatment> {
        let flagged: Vec<&Treatment> = self.treatments.iter().filter(|t| t.is_control).collect();

        match &self.control_id {
            Some(id) => {
                let control = self
                    .treatments
                    .iter()
                    .find(|t| &t.id == id)
                    .ok_or_else(|| EngineError::UnknownControl(id.clone()))?;
                // A flag on some other treatment contradicts the explicit id
                if flagged.iter().any(|t| &t.id != id) {
                    let mut ids: Vec<String> = vec![id.clone()];
                    ids.extend(flagged.iter().filter(|t| &t.id != id).map(|t| t.id.clone()));
                    return Err(EngineError::AmbiguousControl { ids });
                }
                Ok(control)
            }
            None => match flagged.as_slice() {
                [] => Err(EngineError::MissingControl),
                [only] => Ok(only),
                many => Err(EngineError::AmbiguousControl {
                    ids: many.iter().map(|t| t.id.clone()).collect(),
                }),
            },
        }
    }
}
