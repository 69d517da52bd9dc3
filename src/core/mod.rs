mod comparison;
mod config;
mod engine;
mod monte_carlo;
pub mod protocol;
mod rng;
mod runner;
mod scenario;
mod types;

pub use comparison::{SCENARIO_WEIGHTS, compare_scenarios};
pub use config::{
    ConfigError, DEFAULT_HORIZON_YEARS, DEFAULT_NUM_RUNS, DEFAULT_SEED, SamplingBand,
    ScenarioOverrides, SimulationConfig,
};
pub use engine::{adoption_signal, evaluate_failures, step};
pub use monte_carlo::{run_monte_carlo, wilson_interval};
pub use protocol::{burn_rate, emission_rate};
pub use rng::{SimRng, derive_seed};
pub use runner::{RunResult, run_simulation, run_yearly_trace, simulate_run};
pub use scenario::{ParameterBands, initial_state, parameter_bands, prepare_run, sample_parameters};
pub use types::{
    AggregateReport, ConfidenceInterval, Failure, FailureReason, FailureYearStats, MetricStats,
    Outlook, ParameterSet, Recommendation, RiskFactor, RiskLevel, RunOutcome, RunRecord,
    Scenario, ScenarioComparison, ScenarioSummary, StateSnapshot, TerminalStatistics, Verdict,
};
