//! Builds cash-flow series from treatments and ledgers for one scenario

use std::collections::HashMap;

use super::CashflowSeries;
use crate::config::{ConfigurationContext, Scenario};
use crate::error::{EngineError, EngineResult};
use crate::model::{BenefitItem, EvaluationRequest, OtherCostItem, OutputCatalog, Treatment};

/// Cash-flow builder bound to one configuration and price catalog
///
/// Pure: every call returns a fresh series and leaves inputs untouched.
pub struct CashflowBuilder<'a> {
    config: &'a ConfigurationContext,
    prices: HashMap<&'a str, f64>,
}

impl<'a> CashflowBuilder<'a> {
    pub fn new(config: &'a ConfigurationContext, outputs: &'a OutputCatalog) -> Self {
        Self {
            config,
            prices: outputs.price_map(),
        }
    }

    pub fn for_request(request: &'a EvaluationRequest) -> Self {
        Self::new(&request.config, &request.outputs)
    }

    /// Gross output value per hectare at the scenario's price multiplier
    pub fn benefit_per_ha(&self, treatment: &Treatment, scenario: &Scenario) -> EngineResult<f64> {
        let mut value = 0.0;
        for (output_id, delta) in &treatment.deltas {
            let price = self.prices.get(output_id.as_str()).ok_or_else(|| {
                EngineError::UnknownOutput {
                    treatment: treatment.id.clone(),
                    output: output_id.clone(),
                }
            })?;
            value += delta * price * scenario.price_multiplier;
        }
        Ok(value)
    }

    /// Series for a single treatment
    ///
    /// Annual benefit and recurring cost fill indices 1..=N; capital lands at 0.
    pub fn treatment(
        &self,
        treatment: &Treatment,
        scenario: &Scenario,
    ) -> EngineResult<CashflowSeries> {
        let mut series = CashflowSeries::zeros(self.config.series_len());

        let annual_benefit = self.benefit_per_ha(treatment, scenario)?
            * treatment.area_ha
            * scenario.benefit_factor();
        let annual_cost = treatment.annual_cost();

        for t in 1..series.len() {
            series.add_benefit(t, annual_benefit);
            series.add_cost(t, annual_cost, treatment.constrained);
        }
        if treatment.capital_cost != 0.0 {
            series.add_cost(0, treatment.capital_cost, treatment.constrained);
        }
        Ok(series)
    }

    /// Aggregate series over several treatments
    pub fn treatments(
        &self,
        treatments: &[Treatment],
        scenario: &Scenario,
    ) -> EngineResult<CashflowSeries> {
        let mut total = CashflowSeries::zeros(self.config.series_len());
        for treatment in treatments {
            total.accumulate(&self.treatment(treatment, scenario)?);
        }
        Ok(total)
    }

    /// Series for the extra benefit and other-cost ledgers
    pub fn ledgers(
        &self,
        benefits: &[BenefitItem],
        other_costs: &[OtherCostItem],
        scenario: &Scenario,
    ) -> CashflowSeries {
        let mut series = CashflowSeries::zeros(self.config.series_len());
        for item in benefits {
            for (t, amount) in item.postings(self.config, scenario) {
                series.add_benefit(t, amount);
            }
        }
        for item in other_costs {
            for (t, amount) in item.postings(self.config) {
                series.add_cost(t, amount, item.constrained);
            }
        }
        series
    }

    /// Whole-project series: every treatment plus both ledgers
    pub fn project(
        &self,
        request: &EvaluationRequest,
        scenario: &Scenario,
    ) -> EngineResult<CashflowSeries> {
        let mut series = self.treatments(&request.treatments, scenario)?;
        series.accumulate(&self.ledgers(&request.benefits, &request.other_costs, scenario));
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Accrual, OutputDefinition};
    use approx::assert_relative_eq;

    fn catalog() -> OutputCatalog {
        OutputCatalog::new(vec![
            OutputDefinition::new("yield", "Yield", "t/ha", 100.0),
            OutputDefinition::new("straw", "Straw", "t/ha", 10.0),
        ])
    }

    fn config(horizon_years: u32) -> ConfigurationContext {
        ConfigurationContext {
            horizon_years,
            base_year: 2024,
            ..Default::default()
        }
    }

    #[test]
    fn test_treatment_series() {
        let cfg = config(3);
        let outputs = catalog();
        let builder = CashflowBuilder::new(&cfg, &outputs);
        let t = Treatment::new("a", "A", 2.0)
            .with_delta("yield", 0.5)
            .with_delta("straw", 1.0)
            .with_costs(10.0, 5.0, 5.0)
            .with_capital(300.0);

        let s = builder.treatment(&t, &Scenario::new(5.0, 0.5, 0.2)).unwrap();
        // (0.5 * 100 + 1 * 10) * 2 ha * 0.8 * 0.5 = 48
        assert_eq!(s.len(), 4);
        assert_eq!(s.benefit_by_year[0], 0.0);
        for t in 1..4 {
            assert_relative_eq!(s.benefit_by_year[t], 48.0, epsilon = 1e-9);
            assert_relative_eq!(s.cost_by_year[t], 40.0, epsilon = 1e-9);
        }
        assert_eq!(s.cost_by_year[0], 300.0);
        assert!(s.constrained_cost_by_year.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_price_multiplier() {
        let cfg = config(1);
        let outputs = catalog();
        let builder = CashflowBuilder::new(&cfg, &outputs);
        let t = Treatment::new("a", "A", 1.0).with_delta("yield", 1.0);
        let s = builder
            .treatment(&t, &Scenario::new(0.0, 1.0, 0.0).with_price_multiplier(1.25))
            .unwrap();
        assert_relative_eq!(s.benefit_by_year[1], 125.0);
    }

    #[test]
    fn test_unknown_output_is_error() {
        let cfg = config(1);
        let outputs = catalog();
        let builder = CashflowBuilder::new(&cfg, &outputs);
        let t = Treatment::new("a", "A", 1.0).with_delta("oil", 1.0);
        assert!(matches!(
            builder.treatment(&t, &cfg.base_scenario()),
            Err(EngineError::UnknownOutput { .. })
        ));
    }

    #[test]
    fn test_project_includes_ledgers() {
        let mut request = EvaluationRequest::new(
            catalog(),
            vec![
                Treatment::new("c", "Control", 1.0).control().with_delta("yield", 0.0),
                Treatment::new("a", "A", 1.0)
                    .with_delta("yield", 1.0)
                    .constrained()
                    .with_costs(20.0, 0.0, 0.0),
            ],
            config(2),
        );
        request.benefits.push(BenefitItem::new("b", Accrual::C4 { annual_amount: 7.0 }));
        request.other_costs.push(OtherCostItem::capital("k", 50.0, 2024).constrained());

        let builder = CashflowBuilder::for_request(&request);
        let s = builder.project(&request, &Scenario::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(s.benefit_by_year, vec![0.0, 107.0, 107.0]);
        assert_eq!(s.cost_by_year, vec![50.0, 20.0, 20.0]);
        assert_eq!(s.constrained_cost_by_year, vec![50.0, 20.0, 20.0]);
    }
}
