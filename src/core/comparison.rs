use tracing::info;

use super::config::{ConfigError, SimulationConfig};
use super::monte_carlo::run_monte_carlo;
use super::types::{Scenario, ScenarioComparison, ScenarioSummary};

pub const SCENARIO_WEIGHTS: [(Scenario, f64); 3] = [
    (Scenario::Pessimistic, 0.40),
    (Scenario::Realistic, 0.45),
    (Scenario::Optimistic, 0.15),
];

pub fn compare_scenarios(base: &SimulationConfig) -> Result<ScenarioComparison, ConfigError> {
    let mut scenarios = Vec::with_capacity(SCENARIO_WEIGHTS.len());
    let mut weighted_success_rate = 0.0;

    for (offset, &(scenario, weight)) in SCENARIO_WEIGHTS.iter().enumerate() {
        let config = SimulationConfig {
            scenario,
            seed: base.seed.wrapping_add(offset as u64),
            ..*base
        };
        let report = run_monte_carlo(&config)?;
        weighted_success_rate += weight * report.success_rate;

        scenarios.push(ScenarioSummary {
            scenario,
            seed: config.seed,
            weight,
            success_rate: report.success_rate,
            confidence_interval: report.confidence_interval,
            main_risk: report.main_risk(),
            report,
        });
    }

    info!(
        runs = base.num_runs,
        years = base.horizon_years,
        weighted_success_rate,
        "scenario comparison finished"
    );

    Ok(ScenarioComparison {
        num_runs: base.num_runs,
        horizon_years: base.horizon_years,
        scenarios,
        weighted_success_rate,
    })
}
