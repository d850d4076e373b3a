//! Trial Appraisal
//!
//! Cost-benefit engine comparing a control treatment against alternative
//! treatments over a multi-year horizon. Cash flows are built per treatment
//! and for the aggregate project, discounted into NPV, BCR, ROI, IRR, MIRR
//! and payback, ranked against the control, and stress-tested with a seeded
//! Monte Carlo simulation and a discount-rate x price sensitivity grid.
//!
//! ```no_run
//! use trial_appraisal::{appraise, Outcome, TrialParams, TrialTemplate};
//!
//! let request = TrialTemplate::new().generate(&TrialParams::default());
//! if let Outcome::Computed(appraisal) = appraise(&request)? {
//!     println!("best: {:?}", appraisal.ranking.best_alternative().map(|r| &r.treatment_id));
//! }
//! # Ok::<(), trial_appraisal::EngineError>(())
//! ```

pub mod cashflow;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod ranking;
pub mod sensitivity;
pub mod simulation;

pub use config::{ConfigurationContext, Scenario, ScenarioTriple};
pub use engine::{appraise, Appraisal, Appraiser, Outcome};
pub use error::{EngineError, EngineResult};
pub use metrics::{EvaluationResult, Payback};
pub use model::{EvaluationRequest, TrialParams, TrialTemplate};
pub use ranking::{Ranking, RankingEngine};
pub use sensitivity::{SensitivityGridEngine, SensitivityRecord};
pub use simulation::{MonteCarloSimulator, SimulationOutput, SimulationRecord};
