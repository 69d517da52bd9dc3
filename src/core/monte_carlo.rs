use std::collections::BTreeMap;

use tracing::{debug, info};

use super::config::{ConfigError, SimulationConfig};
use super::runner::simulate_run;
use super::types::{
    AggregateReport, ConfidenceInterval, FailureReason, FailureYearStats, MetricStats, Outlook,
    Recommendation, RiskFactor, RiskLevel, RunOutcome, RunRecord, TerminalStatistics, Verdict,
};

const WILSON_Z: f64 = 1.96;
const PROGRESS_EVERY: u32 = 100;

const HIGH_PROBABILITY_THRESHOLD: f64 = 0.70;
const MODERATE_THRESHOLD: f64 = 0.50;
const HIGH_RISK_SHARE: f64 = 0.10;
const MEDIUM_RISK_SHARE: f64 = 0.05;

// Failure counts above which a batch earns a recommendation.
const RECOMMENDATION_RULES: [(FailureReason, u32, Recommendation); 6] = [
    (FailureReason::AdoptionFailure, 5, Recommendation::ExpandOutreach),
    (FailureReason::ValidatorExodus, 5, Recommendation::ImproveValidatorIncentives),
    (FailureReason::Centralization, 5, Recommendation::CapStakeConcentration),
    (FailureReason::GovernanceDeadlock, 5, Recommendation::SimplifyGovernance),
    (FailureReason::SecurityBreach, 3, Recommendation::HardenSecurity),
    (FailureReason::LiquidityCrisis, 3, Recommendation::DiversifyTreasury),
];

#[derive(Default)]
struct TerminalSamples {
    supply: Vec<f64>,
    validators: Vec<f64>,
    accounts: Vec<f64>,
    price: Vec<f64>,
    market_cap: Vec<f64>,
    treasury: Vec<f64>,
}

impl TerminalSamples {
    fn push(&mut self, record: &RunRecord) {
        let terminal = &record.terminal;
        self.supply.push(terminal.total_supply);
        self.validators.push(f64::from(terminal.num_validators));
        self.accounts.push(terminal.active_accounts as f64);
        self.price.push(terminal.token_price_usd);
        self.market_cap.push(terminal.market_cap_usd);
        self.treasury.push(terminal.treasury_balance);
    }

    fn summarize(self) -> Option<TerminalStatistics> {
        if self.supply.is_empty() {
            return None;
        }
        Some(TerminalStatistics {
            supply: MetricStats::from_samples(self.supply),
            validators: MetricStats::from_samples(self.validators),
            accounts: MetricStats::from_samples(self.accounts),
            price: MetricStats::from_samples(self.price),
            market_cap: MetricStats::from_samples(self.market_cap),
            treasury: MetricStats::from_samples(self.treasury),
        })
    }
}

struct BatchAccumulator {
    successes: u32,
    failures: u32,
    failure_reasons: BTreeMap<FailureReason, u32>,
    failure_years: Vec<u32>,
    terminal: TerminalSamples,
    runs: Vec<RunOutcome>,
}

impl BatchAccumulator {
    fn new(num_runs: u32) -> Self {
        Self {
            successes: 0,
            failures: 0,
            failure_reasons: FailureReason::ALL.iter().map(|&r| (r, 0)).collect(),
            failure_years: Vec::new(),
            terminal: TerminalSamples::default(),
            runs: Vec::with_capacity(num_runs as usize),
        }
    }

    fn record(&mut self, record: &RunRecord) {
        match record.terminal.failure {
            Some(failure) => {
                self.failures += 1;
                *self.failure_reasons.entry(failure.reason).or_insert(0) += 1;
                self.failure_years.push(failure.year);
                debug!(
                    run_id = record.run_id,
                    reason = failure.reason.as_str(),
                    year = failure.year,
                    "run failed"
                );
            }
            None => {
                self.successes += 1;
                self.terminal.push(record);
            }
        }

        self.runs.push(RunOutcome {
            run_id: record.run_id,
            success: record.success,
            failure: record.terminal.failure,
            final_supply: record.terminal.total_supply,
            final_validators: record.terminal.num_validators,
            final_accounts: record.terminal.active_accounts,
            final_price: record.terminal.token_price_usd,
            market_sentiment: record.params.market_sentiment,
            adoption_rate: record.params.adoption_rate,
            competition_pressure: record.params.competition_pressure,
        });
    }
}

pub fn run_monte_carlo(config: &SimulationConfig) -> Result<AggregateReport, ConfigError> {
    config.validate()?;

    info!(
        scenario = config.scenario.as_str(),
        runs = config.num_runs,
        years = config.horizon_years,
        seed = config.seed,
        overrides = !config.overrides.is_empty(),
        "starting monte carlo batch"
    );

    let mut acc = BatchAccumulator::new(config.num_runs);
    for run_id in 0..config.num_runs {
        let record = simulate_run(config, run_id);
        acc.record(&record);

        let done = run_id + 1;
        if done % PROGRESS_EVERY == 0 {
            debug!(done, total = config.num_runs, successes = acc.successes, "batch progress");
        }
    }

    let n = config.num_runs.max(1);
    let success_rate = f64::from(acc.successes) / f64::from(n);
    let confidence_interval = wilson_interval(acc.successes, config.num_runs);
    let failure_statistics = failure_year_stats(&acc.failure_years);

    info!(
        scenario = config.scenario.as_str(),
        successes = acc.successes,
        failures = acc.failures,
        success_rate,
        ci_half_width = confidence_interval.half_width(),
        "monte carlo batch finished"
    );

    Ok(AggregateReport {
        scenario: config.scenario,
        num_runs: config.num_runs,
        horizon_years: config.horizon_years,
        seed: config.seed,
        successes: acc.successes,
        failures: acc.failures,
        success_rate,
        failure_reasons: acc.failure_reasons,
        failure_years: acc.failure_years,
        statistics: acc.terminal.summarize(),
        failure_statistics,
        confidence_interval,
        runs: acc.runs,
    })
}

pub fn wilson_interval(successes: u32, trials: u32) -> ConfidenceInterval {
    let n = f64::from(trials.max(1));
    let p = f64::from(successes.min(trials)) / n;
    let z2 = WILSON_Z * WILSON_Z;

    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let spread = WILSON_Z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt() / denominator;

    ConfidenceInterval {
        lower: (center - spread).clamp(0.0, 1.0),
        upper: (center + spread).clamp(0.0, 1.0),
    }
}

fn failure_year_stats(years: &[u32]) -> Option<FailureYearStats> {
    let earliest = *years.iter().min()?;
    let latest = *years.iter().max()?;
    let total: f64 = years.iter().map(|&y| f64::from(y)).sum();
    Some(FailureYearStats {
        mean_failure_year: total / years.len() as f64,
        earliest_failure: earliest,
        latest_failure: latest,
    })
}

impl MetricStats {
    pub fn from_samples(mut values: Vec<f64>) -> Self {
        let samples = values.len();
        if samples == 0 {
            return Self {
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                p10: 0.0,
                p90: 0.0,
                samples,
            };
        }

        let mean = values.iter().sum::<f64>() / samples as f64;
        let std_dev = if samples < 2 {
            0.0
        } else {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (samples - 1) as f64;
            var.sqrt()
        };

        let median = percentile(&mut values, 50.0);
        let p10 = percentile(&mut values, 10.0);
        let p90 = percentile(&mut values, 90.0);

        Self {
            mean,
            median,
            std_dev,
            min: values[0],
            max: values[samples - 1],
            p10,
            p90,
            samples,
        }
    }
}

fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

impl AggregateReport {
    pub fn success_rate_percent(&self) -> f64 {
        self.success_rate * 100.0
    }

    pub fn verdict(&self) -> Verdict {
        if self.success_rate >= HIGH_PROBABILITY_THRESHOLD {
            Verdict::HighProbability
        } else if self.success_rate >= MODERATE_THRESHOLD {
            Verdict::Moderate
        } else {
            Verdict::HighRisk
        }
    }

    pub fn outlook(&self) -> Outlook {
        if self.confidence_interval.lower >= 0.5 {
            Outlook::LikelySuccess
        } else if self.confidence_interval.upper >= 0.5 {
            Outlook::Uncertain
        } else {
            Outlook::LikelyFailure
        }
    }

    pub fn risk_factors(&self) -> Vec<RiskFactor> {
        let n = f64::from(self.num_runs.max(1));
        let mut factors: Vec<RiskFactor> = self
            .failure_reasons
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(&reason, &count)| {
                let probability = f64::from(count) / n;
                let level = if probability >= HIGH_RISK_SHARE {
                    RiskLevel::High
                } else if probability >= MEDIUM_RISK_SHARE {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                };
                RiskFactor {
                    reason,
                    probability,
                    level,
                }
            })
            .collect();

        factors.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        factors
    }

    pub fn main_risk(&self) -> Option<FailureReason> {
        self.risk_factors().first().map(|factor| factor.reason)
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = RECOMMENDATION_RULES
            .iter()
            .filter(|(reason, threshold, _)| {
                self.failure_reasons.get(reason).copied().unwrap_or(0) > *threshold
            })
            .map(|&(_, _, recommendation)| recommendation)
            .collect();

        if recommendations.is_empty() {
            recommendations.push(Recommendation::ParametersBalanced);
            recommendations.push(Recommendation::KeepMonitoring);
        }
        recommendations
    }
}
