//! Evaluation pipeline: one treatment, the whole project, or the full appraisal

use serde::{Deserialize, Serialize};

use crate::cashflow::{
    depreciation_schedules, CashflowBuilder, CashflowSeries, DepreciationSchedule,
};
use crate::config::Scenario;
use crate::error::EngineResult;
use crate::metrics::{evaluate_series, EvaluationResult};
use crate::model::{DegenerateInput, EvaluationRequest, Treatment};
use crate::ranking::{Ranking, RankingEngine};
use crate::sensitivity::{SensitivityGridEngine, SensitivityRecord};
use crate::simulation::{MonteCarloSimulator, SimulationOutput};

/// Result of an entry point: computed values, or an explicit "no results"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed(T),
    NoResults(DegenerateInput),
}

impl<T> Outcome<T> {
    pub fn computed(self) -> Option<T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::NoResults(_) => None,
        }
    }

    pub fn as_computed(&self) -> Option<&T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::NoResults(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Computed(v) => Outcome::Computed(f(v)),
            Outcome::NoResults(reason) => Outcome::NoResults(reason),
        }
    }
}

/// Evaluation of one treatment at one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentEvaluation {
    pub treatment_id: String,
    pub name: String,
    pub is_control: bool,
    pub result: EvaluationResult,
}

/// Evaluator bound to one request
///
/// Holds only shared references; every evaluation is a pure function of the
/// request and the scenario passed in.
pub struct Appraiser<'a> {
    request: &'a EvaluationRequest,
    builder: CashflowBuilder<'a>,
}

impl<'a> Appraiser<'a> {
    /// Validate the request and bind to it
    pub fn new(request: &'a EvaluationRequest) -> EngineResult<Self> {
        request.validate()?;
        Ok(Self::bind(request))
    }

    /// Bind without validation, for copies derived from a validated request
    pub(crate) fn bind(request: &'a EvaluationRequest) -> Self {
        Self {
            request,
            builder: CashflowBuilder::for_request(request),
        }
    }

    pub fn request(&self) -> &'a EvaluationRequest {
        self.request
    }

    pub fn treatment_series(
        &self,
        treatment: &Treatment,
        scenario: &Scenario,
    ) -> EngineResult<CashflowSeries> {
        self.builder.treatment(treatment, scenario)
    }

    pub fn evaluate_treatment(
        &self,
        treatment: &Treatment,
        scenario: &Scenario,
    ) -> EngineResult<EvaluationResult> {
        let series = self.builder.treatment(treatment, scenario)?;
        Ok(evaluate_series(&series, scenario.discount_rate_pct, &self.request.config))
    }

    /// Every treatment in input order
    pub fn evaluate_all(&self, scenario: &Scenario) -> EngineResult<Vec<TreatmentEvaluation>> {
        self.request
            .treatments
            .iter()
            .map(|t| {
                Ok(TreatmentEvaluation {
                    treatment_id: t.id.clone(),
                    name: t.name.clone(),
                    is_control: t.is_control,
                    result: self.evaluate_treatment(t, scenario)?,
                })
            })
            .collect()
    }

    pub fn project_series(&self, scenario: &Scenario) -> EngineResult<CashflowSeries> {
        self.builder.project(self.request, scenario)
    }

    /// Aggregate evaluation: all treatments plus both ledgers
    pub fn evaluate_project(&self, scenario: &Scenario) -> EngineResult<EvaluationResult> {
        let series = self.project_series(scenario)?;
        Ok(evaluate_series(&series, scenario.discount_rate_pct, &self.request.config))
    }
}

/// Everything a full appraisal run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    pub base_scenario: Scenario,
    pub ranking: Ranking,
    pub project: EvaluationResult,
    pub project_series: CashflowSeries,
    pub simulation: SimulationOutput,
    pub sensitivity: Vec<SensitivityRecord>,
    pub depreciation: Vec<DepreciationSchedule>,
}

/// Run ranking, project evaluation, Monte Carlo and the sensitivity grid
pub fn appraise(request: &EvaluationRequest) -> EngineResult<Outcome<Appraisal>> {
    let appraiser = Appraiser::new(request)?;
    if let Some(reason) = request.degeneracy() {
        log::info!("appraisal skipped: {:?}", reason);
        return Ok(Outcome::NoResults(reason));
    }
    log::info!(
        "appraising {} treatments over {} years",
        request.treatments.len(),
        request.config.horizon_years
    );

    let base_scenario = request.config.base_scenario();

    let ranking = match RankingEngine::rank(request)? {
        Outcome::Computed(r) => r,
        Outcome::NoResults(reason) => return Ok(Outcome::NoResults(reason)),
    };
    let project_series = appraiser.project_series(&base_scenario)?;
    let project = evaluate_series(
        &project_series,
        base_scenario.discount_rate_pct,
        &request.config,
    );

    let simulation = match MonteCarloSimulator::new().run(request)? {
        Outcome::Computed(s) => s,
        Outcome::NoResults(reason) => return Ok(Outcome::NoResults(reason)),
    };
    let sensitivity = match SensitivityGridEngine::run(request)? {
        Outcome::Computed(s) => s,
        Outcome::NoResults(reason) => return Ok(Outcome::NoResults(reason)),
    };
    let depreciation = depreciation_schedules(&request.other_costs, &request.config);

    Ok(Outcome::Computed(Appraisal {
        base_scenario,
        ranking,
        project,
        project_series,
        simulation,
        sensitivity,
        depreciation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationContext;
    use crate::error::EngineError;
    use crate::model::{OutputCatalog, OutputDefinition, TrialParams, TrialTemplate};
    use approx::assert_relative_eq;

    fn single_treatment(horizon_years: u32, capital: f64) -> EvaluationRequest {
        // 1 ha, yield delta 1 at price 100 => annual benefit 100; cost 40
        let mut req = EvaluationRequest::new(
            OutputCatalog::new(vec![OutputDefinition::new("yield", "Yield", "t/ha", 100.0)]),
            vec![Treatment::new("t", "Treatment", 1.0)
                .control()
                .with_delta("yield", 1.0)
                .with_costs(40.0, 0.0, 0.0)
                .with_capital(capital)],
            ConfigurationContext {
                horizon_years,
                base_year: 2024,
                ..Default::default()
            },
        );
        req.config.adoption = crate::config::ScenarioTriple::fixed(1.0);
        req.config.risk = crate::config::ScenarioTriple::fixed(0.0);
        req
    }

    #[test]
    fn test_one_year_zero_rate() {
        let req = single_treatment(1, 0.0);
        let appraiser = Appraiser::new(&req).unwrap();
        let r = appraiser
            .evaluate_treatment(&req.treatments[0], &Scenario::new(0.0, 1.0, 0.0))
            .unwrap();
        assert_relative_eq!(r.pv_benefits, 100.0);
        assert_relative_eq!(r.pv_costs, 40.0);
        assert_relative_eq!(r.npv, 60.0);
        assert_relative_eq!(r.bcr.unwrap(), 2.5);
        assert_relative_eq!(r.roi_pct.unwrap(), 150.0);
    }

    #[test]
    fn test_capital_two_years_ten_percent() {
        let req = single_treatment(2, 200.0);
        let appraiser = Appraiser::new(&req).unwrap();
        let r = appraiser
            .evaluate_treatment(&req.treatments[0], &Scenario::new(10.0, 1.0, 0.0))
            .unwrap();
        assert_relative_eq!(r.pv_costs, 200.0 + 40.0 / 1.1 + 40.0 / 1.21, epsilon = 1e-9);
    }

    #[test]
    fn test_project_equals_treatment_without_ledgers() {
        let req = single_treatment(5, 50.0);
        let appraiser = Appraiser::new(&req).unwrap();
        let s = req.config.base_scenario();
        let project = appraiser.evaluate_project(&s).unwrap();
        let single = appraiser.evaluate_treatment(&req.treatments[0], &s).unwrap();
        assert_eq!(project, single);
    }

    #[test]
    fn test_appraise_generated_trial() {
        let mut req = TrialTemplate::new().generate(&TrialParams::default());
        req.config.monte_carlo.run_count = 200;
        req.config.monte_carlo.seed = Some(7);

        let appraisal = appraise(&req).unwrap().computed().unwrap();
        assert_eq!(appraisal.ranking.rows.len(), 5);
        assert_eq!(appraisal.simulation.records.len(), 200);
        let axes = &req.config.sensitivity;
        assert_eq!(
            appraisal.sensitivity.len(),
            axes.discount_rates_pct.len() * axes.price_multipliers.len()
        );
        assert_eq!(appraisal.depreciation.len(), 1);
    }

    #[test]
    fn test_appraise_degenerate_and_invalid() {
        let mut req = single_treatment(3, 0.0);
        req.treatments.clear();
        assert_eq!(appraise(&req).unwrap(), Outcome::NoResults(DegenerateInput::NoTreatments));

        let mut req = single_treatment(3, 0.0);
        req.config.horizon_years = 0;
        assert_eq!(appraise(&req).unwrap(), Outcome::NoResults(DegenerateInput::ZeroHorizon));

        let mut req = single_treatment(3, 0.0);
        req.treatments[0].is_control = false;
        assert_eq!(appraise(&req).unwrap_err(), EngineError::MissingControl);

        let mut req = single_treatment(3, 0.0);
        req.outputs = OutputCatalog::default();
        assert_eq!(appraise(&req).unwrap_err(), EngineError::EmptyOutputCatalog);
    }
}
