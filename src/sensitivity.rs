//! Deterministic grid over discount rate x price multiplier
//!
//! Every cell re-ranks all treatments at the base adoption and risk with the
//! cell's discount rate and every output price scaled by the multiplier.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Scenario;
use crate::engine::{Appraiser, Outcome};
use crate::error::EngineResult;
use crate::model::EvaluationRequest;
use crate::ranking::RankingEngine;

/// Best alternative and control NPV at one grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRecord {
    pub discount_rate_pct: f64,
    pub price_multiplier: f64,
    pub best_treatment_id: String,
    pub best_npv: f64,
    pub control_npv: f64,
    /// Full treatment order at this cell, control included
    pub ranked_ids: Vec<String>,
}

pub struct SensitivityGridEngine;

impl SensitivityGridEngine {
    /// Evaluate every cell in rate-major order
    ///
    /// Cells without a non-control treatment emit no record.
    pub fn run(request: &EvaluationRequest) -> EngineResult<Outcome<Vec<SensitivityRecord>>> {
        let appraiser = Appraiser::new(request)?;
        if let Some(reason) = request.degeneracy() {
            return Ok(Outcome::NoResults(reason));
        }

        let base = request.config.base_scenario();
        let axes = &request.config.sensitivity;
        let cells: Vec<Scenario> = axes
            .discount_rates_pct
            .iter()
            .flat_map(|rate| {
                axes.price_multipliers
                    .iter()
                    .map(move |mult| base.with_discount_rate(*rate).with_price_multiplier(*mult))
            })
            .collect();

        #[cfg(feature = "parallel")]
        let evaluated: EngineResult<Vec<Option<SensitivityRecord>>> = cells
            .par_iter()
            .map(|cell| Self::evaluate_cell(&appraiser, cell))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let evaluated: EngineResult<Vec<Option<SensitivityRecord>>> = cells
            .iter()
            .map(|cell| Self::evaluate_cell(&appraiser, cell))
            .collect();

        let records: Vec<SensitivityRecord> = evaluated?.into_iter().flatten().collect();
        log::info!(
            "sensitivity grid: {} cells, {} records",
            cells.len(),
            records.len()
        );
        Ok(Outcome::Computed(records))
    }

    /// Rank at one cell; `None` when no alternative to the control exists
    pub fn evaluate_cell(
        appraiser: &Appraiser<'_>,
        scenario: &Scenario,
    ) -> EngineResult<Option<SensitivityRecord>> {
        let ranking = RankingEngine::rank_at(appraiser, scenario)?;
        let (Some(best), Some(control)) = (ranking.best_alternative(), ranking.control()) else {
            log::debug!(
                "no alternative treatment at {:.2}% x {:.2}",
                scenario.discount_rate_pct,
                scenario.price_multiplier
            );
            return Ok(None);
        };

        Ok(Some(SensitivityRecord {
            discount_rate_pct: scenario.discount_rate_pct,
            price_multiplier: scenario.price_multiplier,
            best_treatment_id: best.treatment_id.clone(),
            best_npv: best.result.npv,
            control_npv: control.result.npv,
            ranked_ids: ranking.order(),
        }))
    }
}
