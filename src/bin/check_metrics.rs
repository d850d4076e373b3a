//! Compare engine metrics with closed-form reference values
//!
//! Case 1: 1 ha, benefit 100/yr, cost 40/yr, 1 year at 0%
//! Case 2: same treatment with capital 200 at year 0, 2 years at 10%

use trial_appraisal::config::ScenarioTriple;
use trial_appraisal::metrics::{irr_pct, mirr_pct, npv_at};
use trial_appraisal::model::{OutputCatalog, OutputDefinition, Treatment};
use trial_appraisal::{Appraiser, ConfigurationContext, EngineResult, EvaluationRequest, Scenario};

fn request(horizon_years: u32, capital: f64) -> EvaluationRequest {
    let mut config = ConfigurationContext {
        horizon_years,
        base_year: 2024,
        ..Default::default()
    };
    config.adoption = ScenarioTriple::fixed(1.0);
    config.risk = ScenarioTriple::fixed(0.0);

    EvaluationRequest::new(
        OutputCatalog::new(vec![OutputDefinition::new("yield", "Yield", "t/ha", 100.0)]),
        vec![Treatment::new("t", "Treatment", 1.0)
            .control()
            .with_delta("yield", 1.0)
            .with_costs(40.0, 0.0, 0.0)
            .with_capital(capital)],
        config,
    )
}

fn row(label: &str, engine: f64, reference: f64) {
    println!(
        "{:<22} {:<16.8} {:<16.8} {:<12.2e}",
        label,
        engine,
        reference,
        engine - reference
    );
}

fn main() -> EngineResult<()> {
    env_logger::init();

    println!("{:<22} {:<16} {:<16} {:<12}", "Metric", "Engine", "Reference", "Diff");

    let req = request(1, 0.0);
    let r = Appraiser::new(&req)?
        .evaluate_treatment(&req.treatments[0], &Scenario::new(0.0, 1.0, 0.0))?;
    println!("-- 1 year, 0%");
    row("pv_benefits", r.pv_benefits, 100.0);
    row("pv_costs", r.pv_costs, 40.0);
    row("npv", r.npv, 60.0);
    row("bcr", r.bcr.unwrap_or(f64::NAN), 2.5);
    row("roi_pct", r.roi_pct.unwrap_or(f64::NAN), 150.0);

    let req = request(2, 200.0);
    let r = Appraiser::new(&req)?
        .evaluate_treatment(&req.treatments[0], &Scenario::new(10.0, 1.0, 0.0))?;
    println!("-- 2 years, 10%, capital 200");
    row("pv_costs", r.pv_costs, 200.0 + 40.0 / 1.1 + 40.0 / 1.21);
    row("pv_benefits", r.pv_benefits, 100.0 / 1.1 + 100.0 / 1.21);

    // Net flows -200, 60, 60: IRR solves 60/(1+r) + 60/(1+r)^2 = 200
    let net = [-200.0, 60.0, 60.0];
    if let Some(irr) = irr_pct(&net) {
        row("npv at irr", npv_at(&net, irr / 100.0), 0.0);
    } else {
        println!("{:<22} undefined", "irr_pct");
    }

    // MIRR: ((FV of inflows at 4%) / (PV of outflows at 6%))^(1/2) - 1
    let reference = ((60.0 * 1.04 + 60.0) / 200.0_f64).powf(0.5) - 1.0;
    row("mirr_pct", mirr_pct(&net, 6.0, 4.0).unwrap_or(f64::NAN), reference * 100.0);

    Ok(())
}
