//! Monte Carlo simulation over scenario parameters and input prices/costs
//!
//! Each iteration draws discount rate, adoption and risk from their triangular
//! distributions, optionally shocks prices and costs on a cloned copy of the
//! request, and evaluates the aggregate project. The caller's request is
//! never mutated.

mod rng;
mod summary;
mod triangular;

pub use rng::{Mulberry32, RandSource, UniformSource};
pub use summary::{
    summarize, summarize_bcr, BcrSummary, DistributionSummary, Histogram, HistogramBin,
};
pub use triangular::triangular;

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::config::{MonteCarloConfig, Scenario};
use crate::engine::{Appraiser, Outcome};
use crate::error::EngineResult;
use crate::model::{adjusted_copy, AdjustmentParams, EvaluationRequest};

/// Lifecycle of a simulator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationState {
    Idle,
    Running,
    Complete,
}

/// One draw and its project result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub discount_rate_pct: f64,
    pub adoption_multiplier: f64,
    pub risk_multiplier: f64,
    /// `None` when the NPV is not finite
    pub npv: Option<f64>,
    pub bcr: Option<f64>,
}

/// Iterations completed so far, reported between batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Seed actually used; `None` for an externally supplied source
    pub seed: Option<u32>,
    pub runs_requested: usize,
    /// Stopped early by the progress callback
    pub cancelled: bool,
    pub records: Vec<SimulationRecord>,
    pub npv: Option<DistributionSummary>,
    pub bcr: Option<BcrSummary>,
    pub npv_histogram: Histogram,
    pub bcr_histogram: Histogram,
    pub undefined_npv: usize,
    pub undefined_bcr: usize,
}

impl SimulationOutput {
    fn summarize(
        seed: Option<u32>,
        mc: &MonteCarloConfig,
        records: Vec<SimulationRecord>,
        cancelled: bool,
    ) -> Self {
        let npvs: Vec<Option<f64>> = records.iter().map(|r| r.npv).collect();
        let bcrs: Vec<Option<f64>> = records.iter().map(|r| r.bcr).collect();
        let undefined = |col: &[Option<f64>]| {
            col.iter()
                .filter(|v| !v.is_some_and(f64::is_finite))
                .count()
        };

        Self {
            seed,
            runs_requested: mc.run_count,
            cancelled,
            npv: summarize(&npvs),
            bcr: summarize_bcr(&bcrs, mc.bcr_target),
            npv_histogram: Histogram::build(&npvs, mc.histogram_bins),
            bcr_histogram: Histogram::build(&bcrs, mc.histogram_bins),
            undefined_npv: undefined(&npvs),
            undefined_bcr: undefined(&bcrs),
            records,
        }
    }
}

/// Seeded Monte Carlo driver
#[derive(Debug)]
pub struct MonteCarloSimulator {
    state: SimulationState,
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MonteCarloSimulator {
    pub fn new() -> Self {
        Self {
            state: SimulationState::Idle,
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Run with the configured seed (or a fresh one) to completion
    pub fn run(&mut self, request: &EvaluationRequest) -> EngineResult<Outcome<SimulationOutput>> {
        self.run_with_progress(request, |_| ControlFlow::Continue(()))
    }

    /// Run with Mulberry32, calling `on_batch` after every batch
    ///
    /// Returning `ControlFlow::Break(())` stops the run; records drawn so far
    /// are kept and the output is marked cancelled.
    pub fn run_with_progress<F>(
        &mut self,
        request: &EvaluationRequest,
        on_batch: F,
    ) -> EngineResult<Outcome<SimulationOutput>>
    where
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let (mut rng, seed) = match request.config.monte_carlo.seed {
            Some(seed) => (Mulberry32::new(seed), seed),
            None => Mulberry32::from_entropy(),
        };
        let outcome = self.run_with_source(request, &mut rng, on_batch)?;
        Ok(outcome.map(|mut out| {
            out.seed = Some(seed);
            out
        }))
    }

    /// Run against any uniform source
    pub fn run_with_source<F>(
        &mut self,
        request: &EvaluationRequest,
        source: &mut dyn UniformSource,
        mut on_batch: F,
    ) -> EngineResult<Outcome<SimulationOutput>>
    where
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        Appraiser::new(request)?;
        if let Some(reason) = request.degeneracy() {
            return Ok(Outcome::NoResults(reason));
        }

        let mc = &request.config.monte_carlo;
        let total = mc.run_count;
        log::info!(
            "monte carlo: {} runs, seed {:?}, shocks {}",
            total,
            mc.seed,
            if mc.vary.any() {
                format!("+/-{}%", mc.variation_pct)
            } else {
                "off".to_string()
            }
        );

        self.state = SimulationState::Running;
        let mut records = Vec::with_capacity(total);
        let mut cancelled = false;
        while records.len() < total {
            let batch_end = (records.len() + mc.batch_size).min(total);
            while records.len() < batch_end {
                match draw(request, source) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        self.state = SimulationState::Idle;
                        return Err(e);
                    }
                }
            }
            let progress = Progress {
                completed: records.len(),
                total,
            };
            if on_batch(progress).is_break() && records.len() < total {
                log::warn!("monte carlo cancelled after {} of {} runs", records.len(), total);
                cancelled = true;
                break;
            }
        }
        self.state = SimulationState::Complete;

        let output = SimulationOutput::summarize(None, mc, records, cancelled);
        log::info!(
            "monte carlo complete: {} records, {} undefined NPV",
            output.records.len(),
            output.undefined_npv
        );
        Ok(Outcome::Computed(output))
    }
}

/// Multipliers drawn uniformly from [1 - v, 1 + v]
fn shocks(source: &mut dyn UniformSource, count: usize, v: f64) -> Vec<f64> {
    (0..count).map(|_| 1.0 + v * (2.0 * source.next_uniform() - 1.0)).collect()
}

/// One iteration: three triangular draws, optional shocks, project evaluation
fn draw(
    request: &EvaluationRequest,
    source: &mut dyn UniformSource,
) -> EngineResult<SimulationRecord> {
    let config = &request.config;
    let mc = &config.monte_carlo;

    let discount_rate_pct = triangular(source.next_uniform(), &config.discount_rate_pct);
    let adoption = triangular(source.next_uniform(), &config.adoption).clamp(0.0, 1.0);
    let risk = triangular(source.next_uniform(), &config.risk).clamp(0.0, 1.0);
    let scenario = Scenario::new(discount_rate_pct, adoption, risk);

    let v = mc.variation_pct / 100.0;
    let mut params = AdjustmentParams::default();
    if mc.vary.prices {
        params.price_mult = shocks(source, request.outputs.len(), v);
    }
    if mc.vary.treatment_costs {
        params.treatment_cost_mult = shocks(source, request.treatments.len(), v);
    }
    if mc.vary.other_costs {
        params.other_cost_mult = shocks(source, request.other_costs.len(), v);
    }

    let result = if params.is_identity() {
        Appraiser::bind(request).evaluate_project(&scenario)?
    } else {
        let copy = adjusted_copy(request, &params);
        Appraiser::bind(&copy).evaluate_project(&scenario)?
    };

    Ok(SimulationRecord {
        discount_rate_pct,
        adoption_multiplier: adoption,
        risk_multiplier: risk,
        npv: result.finite_npv(),
        bcr: result.bcr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScenarioTriple, VaryFlags};
    use crate::model::{TrialParams, TrialTemplate};
    use approx::assert_relative_eq;

    fn request(seed: Option<u32>, runs: usize) -> EvaluationRequest {
        let mut req = TrialTemplate::new().generate(&TrialParams::default());
        req.config.monte_carlo.seed = seed;
        req.config.monte_carlo.run_count = runs;
        req.config.monte_carlo.vary = VaryFlags::all();
        req
    }

    fn mean_npv(out: &SimulationOutput) -> f64 {
        out.npv.as_ref().unwrap().mean
    }

    #[test]
    fn test_same_seed_identical_records() {
        let req = request(Some(12345), 300);
        let a = MonteCarloSimulator::new().run(&req).unwrap().computed().unwrap();
        let b = MonteCarloSimulator::new().run(&req).unwrap().computed().unwrap();
        assert_eq!(a.records, b.records);
        assert_eq!(a.seed, Some(12345));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = MonteCarloSimulator::new()
            .run(&request(Some(1), 500))
            .unwrap()
            .computed()
            .unwrap();
        let b = MonteCarloSimulator::new()
            .run(&request(Some(2), 500))
            .unwrap()
            .computed()
            .unwrap();
        assert_ne!(mean_npv(&a), mean_npv(&b));
    }

    #[test]
    fn test_request_left_untouched() {
        let req = request(Some(3), 200);
        let before = req.clone();
        MonteCarloSimulator::new().run(&req).unwrap();
        assert_eq!(req, before);
    }

    #[test]
    fn test_fixed_inputs_collapse_to_base_npv() {
        let mut req = request(Some(99), 50);
        req.config.discount_rate_pct = ScenarioTriple::fixed(7.0);
        req.config.adoption = ScenarioTriple::fixed(0.8);
        req.config.risk = ScenarioTriple::fixed(0.15);
        req.config.monte_carlo.variation_pct = 0.0;

        let base = Appraiser::new(&req)
            .unwrap()
            .evaluate_project(&req.config.base_scenario())
            .unwrap();
        let out = MonteCarloSimulator::new().run(&req).unwrap().computed().unwrap();
        let summary = out.npv.unwrap();
        assert_relative_eq!(summary.min, base.npv, epsilon = 1e-6);
        assert_relative_eq!(summary.max, base.npv, epsilon = 1e-6);
        assert_eq!(out.npv_histogram.bins.len(), 1);
    }

    #[test]
    fn test_adoption_and_risk_within_unit_interval() {
        let req = request(Some(5), 400);
        let out = MonteCarloSimulator::new().run(&req).unwrap().computed().unwrap();
        for r in &out.records {
            assert!((0.0..=1.0).contains(&r.adoption_multiplier));
            assert!((0.0..=1.0).contains(&r.risk_multiplier));
            assert!(r.discount_rate_pct >= 4.0 && r.discount_rate_pct <= 10.0);
        }
        assert_eq!(out.npv_histogram.total(), out.records.len() - out.undefined_npv);
        assert_eq!(out.npv_histogram.bins.len(), 20);
    }

    #[test]
    fn test_cancellation_between_batches() {
        let mut req = request(Some(8), 1000);
        req.config.monte_carlo.batch_size = 100;

        let mut sim = MonteCarloSimulator::new();
        assert_eq!(sim.state(), SimulationState::Idle);
        let mut calls = 0;
        let out = sim
            .run_with_progress(&req, |p| {
                calls += 1;
                if p.completed >= 300 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap()
            .computed()
            .unwrap();
        assert_eq!(calls, 3);
        assert!(out.cancelled);
        assert_eq!(out.records.len(), 300);
        assert_eq!(sim.state(), SimulationState::Complete);

        // Consumed draws match the first 300 of an uncancelled run
        let full = MonteCarloSimulator::new().run(&req).unwrap().computed().unwrap();
        assert_eq!(&full.records[..300], &out.records[..]);
    }

    #[test]
    fn test_unseeded_run_reports_seed() {
        let req = request(None, 20);
        let out = MonteCarloSimulator::new().run(&req).unwrap().computed().unwrap();
        let seed = out.seed.unwrap();

        let replay = MonteCarloSimulator::new()
            .run(&request(Some(seed), 20))
            .unwrap()
            .computed()
            .unwrap();
        assert_eq!(out.records, replay.records);
    }

    #[test]
    fn test_custom_source() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let req = request(None, 30);
        let mut source = RandSource(StdRng::seed_from_u64(11));
        let out = MonteCarloSimulator::new()
            .run_with_source(&req, &mut source, |_| ControlFlow::Continue(()))
            .unwrap()
            .computed()
            .unwrap();
        assert_eq!(out.records.len(), 30);
        assert_eq!(out.seed, None);
    }

    #[test]
    fn test_degenerate_request() {
        let mut req = request(Some(1), 10);
        req.config.horizon_years = 0;
        let mut sim = MonteCarloSimulator::new();
        assert!(!sim.run(&req).unwrap().is_computed());
        assert_eq!(sim.state(), SimulationState::Idle);
    }
}
