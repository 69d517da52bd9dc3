use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::protocol::{
    GENESIS_SUPPLY, INITIAL_CIRCULATING_SHARE, INITIAL_RESERVE_SHARE, INITIAL_TREASURY_SHARE,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Default,
    Pessimistic,
    Realistic,
    Optimistic,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Default => "default",
            Scenario::Pessimistic => "pessimistic",
            Scenario::Realistic => "realistic",
            Scenario::Optimistic => "optimistic",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    EconomicCollapse,
    ValidatorExodus,
    GovernanceDeadlock,
    SecurityBreach,
    AdoptionFailure,
    LiquidityCrisis,
    Centralization,
}

impl FailureReason {
    pub const ALL: [FailureReason; 7] = [
        FailureReason::EconomicCollapse,
        FailureReason::ValidatorExodus,
        FailureReason::GovernanceDeadlock,
        FailureReason::SecurityBreach,
        FailureReason::AdoptionFailure,
        FailureReason::LiquidityCrisis,
        FailureReason::Centralization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::EconomicCollapse => "economic_collapse",
            FailureReason::ValidatorExodus => "validator_exodus",
            FailureReason::GovernanceDeadlock => "governance_deadlock",
            FailureReason::SecurityBreach => "security_breach",
            FailureReason::AdoptionFailure => "adoption_failure",
            FailureReason::LiquidityCrisis => "liquidity_crisis",
            FailureReason::Centralization => "centralization",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub reason: FailureReason,
    pub year: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub year: u32,

    pub total_supply: f64,
    pub total_minted: f64,
    pub total_burned: f64,
    pub circulating_supply: f64,
    pub treasury_balance: f64,
    pub reserve_balance: f64,

    pub num_validators: u32,
    pub total_staked: f64,
    pub active_accounts: u64,
    pub transactions_per_day: f64,

    pub proposals_passed: u64,
    pub proposals_failed: u64,
    pub governance_participation: f64,

    pub largest_stake_share: f64,
    pub attack_attempts: u32,
    pub successful_attacks: u32,

    pub token_price_usd: f64,
    pub market_cap_usd: f64,

    pub failure: Option<Failure>,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            year: 0,
            total_supply: GENESIS_SUPPLY,
            total_minted: 0.0,
            total_burned: 0.0,
            circulating_supply: GENESIS_SUPPLY * INITIAL_CIRCULATING_SHARE,
            treasury_balance: GENESIS_SUPPLY * INITIAL_TREASURY_SHARE,
            reserve_balance: GENESIS_SUPPLY * INITIAL_RESERVE_SHARE,
            num_validators: 21,
            total_staked: 500_000.0,
            active_accounts: 500,
            transactions_per_day: 500.0,
            proposals_passed: 0,
            proposals_failed: 0,
            governance_participation: 0.5,
            largest_stake_share: 0.15,
            attack_attempts: 0,
            successful_attacks: 0,
            token_price_usd: 0.10,
            market_cap_usd: 0.0,
            failure: None,
        }
    }
}

impl StateSnapshot {
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure.map(|f| f.reason)
    }

    pub fn failure_year(&self) -> Option<u32> {
        self.failure.map(|f| f.year)
    }

    pub fn total_proposals(&self) -> u64 {
        self.proposals_passed + self.proposals_failed
    }
}

/// Stochastic drivers sampled once per run and frozen for its whole horizon.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub market_sentiment: f64,
    pub adoption_rate: f64,
    pub competition_pressure: f64,
    pub validator_reliability: f64,
    pub attack_probability: f64,
    pub governance_engagement: f64,
    pub shock_probability: f64,
    pub development_pace: f64,
}

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub run_id: u32,
    pub success: bool,
    pub terminal: StateSnapshot,
    pub history: Vec<StateSnapshot>,
    pub params: ParameterSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p90: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalStatistics {
    pub supply: MetricStats,
    pub validators: MetricStats,
    pub accounts: MetricStats,
    pub price: MetricStats,
    pub market_cap: MetricStats,
    pub treasury: MetricStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureYearStats {
    pub mean_failure_year: f64,
    pub earliest_failure: u32,
    pub latest_failure: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub run_id: u32,
    pub success: bool,
    pub failure: Option<Failure>,
    pub final_supply: f64,
    pub final_validators: u32,
    pub final_accounts: u64,
    pub final_price: f64,
    pub market_sentiment: f64,
    pub adoption_rate: f64,
    pub competition_pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub scenario: Scenario,
    pub num_runs: u32,
    pub horizon_years: u32,
    pub seed: u64,
    pub successes: u32,
    pub failures: u32,
    pub success_rate: f64,
    pub failure_reasons: BTreeMap<FailureReason, u32>,
    pub failure_years: Vec<u32>,
    pub statistics: Option<TerminalStatistics>,
    pub failure_statistics: Option<FailureYearStats>,
    pub confidence_interval: ConfidenceInterval,
    pub runs: Vec<RunOutcome>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    HighProbability,
    Moderate,
    HighRisk,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outlook {
    LikelySuccess,
    Uncertain,
    LikelyFailure,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    ExpandOutreach,
    ImproveValidatorIncentives,
    CapStakeConcentration,
    SimplifyGovernance,
    HardenSecurity,
    DiversifyTreasury,
    ParametersBalanced,
    KeepMonitoring,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::ExpandOutreach => "Increase marketing and developer outreach efforts",
            Recommendation::ImproveValidatorIncentives => {
                "Improve validator incentives and reduce minimum stake"
            }
            Recommendation::CapStakeConcentration => {
                "Implement stake caps or quadratic voting mechanisms"
            }
            Recommendation::SimplifyGovernance => {
                "Simplify governance process, reduce quorum requirements"
            }
            Recommendation::HardenSecurity => "Enhance slashing penalties and security audits",
            Recommendation::DiversifyTreasury => {
                "Increase treasury allocation or diversify treasury"
            }
            Recommendation::ParametersBalanced => "Current protocol parameters appear well-balanced",
            Recommendation::KeepMonitoring => {
                "Continue monitoring and adjust based on real-world data"
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub reason: FailureReason,
    pub probability: f64,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub seed: u64,
    pub weight: f64,
    pub success_rate: f64,
    pub confidence_interval: ConfidenceInterval,
    pub main_risk: Option<FailureReason>,
    pub report: AggregateReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub num_runs: u32,
    pub horizon_years: u32,
    pub scenarios: Vec<ScenarioSummary>,
    pub weighted_success_rate: f64,
}
