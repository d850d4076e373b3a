//! Orders treatments by NPV and compares each against the control

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::Scenario;
use crate::engine::{Appraiser, Outcome, TreatmentEvaluation};
use crate::error::{EngineError, EngineResult};
use crate::metrics::EvaluationResult;
use crate::model::EvaluationRequest;

/// One row of a ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTreatment {
    /// Dense rank, 1 = highest NPV; equal NPVs share a rank
    pub rank: usize,
    pub treatment_id: String,
    pub name: String,
    pub is_control: bool,
    pub result: EvaluationResult,
    /// NPV minus control NPV; `None` for the control itself
    pub delta_npv: Option<f64>,
    /// PV of costs minus control PV of costs; `None` for the control itself
    pub delta_pv_costs: Option<f64>,
}

/// Treatments sorted by descending NPV at one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub scenario: Scenario,
    pub control_id: String,
    pub rows: Vec<RankedTreatment>,
}

impl Ranking {
    pub fn control(&self) -> Option<&RankedTreatment> {
        self.rows.iter().find(|r| r.is_control)
    }

    /// Highest-ranked non-control treatment
    pub fn best_alternative(&self) -> Option<&RankedTreatment> {
        self.rows.iter().find(|r| !r.is_control)
    }

    /// Treatment ids in rank order
    pub fn order(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.treatment_id.clone()).collect()
    }
}

/// Descending by NPV; undefined NPV sorts last
fn compare_npv(a: &EvaluationResult, b: &EvaluationResult) -> Ordering {
    match (a.finite_npv(), b.finite_npv()) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub struct RankingEngine;

impl RankingEngine {
    /// Rank every treatment at the base-case scenario
    pub fn rank(request: &EvaluationRequest) -> EngineResult<Outcome<Ranking>> {
        let appraiser = Appraiser::new(request)?;
        if let Some(reason) = request.degeneracy() {
            return Ok(Outcome::NoResults(reason));
        }
        let ranking = Self::rank_at(&appraiser, &request.config.base_scenario())?;
        Ok(Outcome::Computed(ranking))
    }

    /// Rank at an arbitrary scenario; fails fast without exactly one control
    pub fn rank_at(appraiser: &Appraiser<'_>, scenario: &Scenario) -> EngineResult<Ranking> {
        let control_id = appraiser.request().control()?.id.clone();
        let mut evaluations = appraiser.evaluate_all(scenario)?;
        for e in &mut evaluations {
            e.is_control = e.treatment_id == control_id;
        }

        let control = evaluations
            .iter()
            .find(|e| e.is_control)
            .map(|e| e.result)
            .ok_or_else(|| EngineError::UnknownControl(control_id.clone()))?;

        // Stable: equal NPVs keep input order
        evaluations.sort_by(|a, b| compare_npv(&a.result, &b.result));

        let mut rows = Vec::with_capacity(evaluations.len());
        let mut rank = 0;
        let mut previous: Option<f64> = None;
        for TreatmentEvaluation {
            treatment_id,
            name,
            is_control,
            result,
        } in evaluations
        {
            let npv = result.finite_npv();
            if rank == 0 || npv.is_none() || npv != previous {
                rank += 1;
            }
            previous = npv;

            let (delta_npv, delta_pv_costs) = if is_control {
                (None, None)
            } else {
                (
                    Some(result.npv - control.npv),
                    Some(result.pv_costs - control.pv_costs),
                )
            };
            rows.push(RankedTreatment {
                rank,
                treatment_id,
                name,
                is_control,
                result,
                delta_npv,
                delta_pv_costs,
            });
        }

        log::debug!(
            "ranked {} treatments at {:.2}% (control '{}')",
            rows.len(),
            scenario.discount_rate_pct,
            control_id
        );

        Ok(Ranking {
            scenario: *scenario,
            control_id,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigurationContext, ScenarioTriple};
    use crate::model::{OutputCatalog, OutputDefinition, Treatment};
    use approx::assert_relative_eq;

    fn request() -> EvaluationRequest {
        let mut config = ConfigurationContext {
            horizon_years: 5,
            base_year: 2024,
            ..Default::default()
        };
        config.adoption = ScenarioTriple::fixed(1.0);
        config.risk = ScenarioTriple::fixed(0.0);
        config.discount_rate_pct = ScenarioTriple::fixed(5.0);

        EvaluationRequest::new(
            OutputCatalog::new(vec![OutputDefinition::new("yield", "Yield", "t/ha", 100.0)]),
            vec![
                Treatment::new("control", "Control", 1.0).control().with_costs(10.0, 0.0, 0.0),
                Treatment::new("low", "Low", 1.0)
                    .with_delta("yield", 0.2)
                    .with_costs(12.0, 0.0, 0.0),
                Treatment::new("high", "High", 1.0)
                    .with_delta("yield", 0.8)
                    .with_costs(30.0, 0.0, 0.0),
                Treatment::new("mid", "Mid", 1.0)
                    .with_delta("yield", 0.5)
                    .with_costs(20.0, 0.0, 0.0),
            ],
            config,
        )
    }

    #[test]
    fn test_rank_order_and_deltas() {
        let req = request();
        let ranking = RankingEngine::rank(&req).unwrap().computed().unwrap();

        assert_eq!(ranking.order(), vec!["high", "mid", "low", "control"]);
        assert_eq!(
            ranking.rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(ranking.best_alternative().unwrap().treatment_id, "high");

        let control = ranking.control().unwrap();
        assert_eq!(control.delta_npv, None);
        let high = &ranking.rows[0];
        assert_relative_eq!(
            high.delta_npv.unwrap(),
            high.result.npv - control.result.npv,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            high.delta_pv_costs.unwrap(),
            high.result.pv_costs - control.result.pv_costs,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_ties_share_rank() {
        let mut req = request();
        req.treatments.push(
            Treatment::new("mid2", "Mid copy", 1.0)
                .with_delta("yield", 0.5)
                .with_costs(20.0, 0.0, 0.0),
        );
        let ranking = RankingEngine::rank(&req).unwrap().computed().unwrap();
        assert_eq!(ranking.order(), vec!["high", "mid", "mid2", "low", "control"]);
        assert_eq!(
            ranking.rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 2, 3, 4]
        );
    }

    #[test]
    fn test_missing_control_fails_fast() {
        let mut req = request();
        req.treatments[0].is_control = false;
        assert_eq!(RankingEngine::rank(&req).unwrap_err(), EngineError::MissingControl);
    }

    #[test]
    fn test_explicit_control_id() {
        let mut req = request();
        req.treatments[0].is_control = false;
        req.control_id = Some("low".into());
        let ranking = RankingEngine::rank(&req).unwrap().computed().unwrap();
        assert_eq!(ranking.control_id, "low");
        assert_eq!(ranking.control().unwrap().treatment_id, "low");
    }

    #[test]
    fn test_no_treatments() {
        let mut req = request();
        req.treatments.clear();
        assert!(!RankingEngine::rank(&req).unwrap().is_computed());
    }
}
