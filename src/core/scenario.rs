use super::config::ScenarioOverrides;
use super::protocol::MIN_VALIDATOR_STAKE;
use super::rng::SimRng;
use super::types::{ParameterSet, Scenario, StateSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBands {
    pub market_sentiment: (f64, f64),
    pub adoption_rate: (f64, f64),
    pub competition_pressure: (f64, f64),
    pub validator_reliability: (f64, f64),
    pub attack_probability: (f64, f64),
    pub governance_engagement: (f64, f64),
    pub shock_probability: (f64, f64),
    pub development_pace: (f64, f64),
}

const DEFAULT_BANDS: ParameterBands = ParameterBands {
    market_sentiment: (-0.8, 0.8),
    adoption_rate: (0.3, 2.5),
    competition_pressure: (0.1, 0.9),
    validator_reliability: (0.75, 0.99),
    attack_probability: (0.01, 0.15),
    governance_engagement: (0.25, 0.85),
    shock_probability: (0.02, 0.12),
    development_pace: (0.4, 1.8),
};

const PESSIMISTIC_BANDS: ParameterBands = ParameterBands {
    market_sentiment: (-0.8, 0.0),
    adoption_rate: (0.2, 0.8),
    competition_pressure: (0.5, 0.95),
    validator_reliability: (0.70, 0.90),
    attack_probability: (0.05, 0.20),
    governance_engagement: (0.20, 0.50),
    shock_probability: (0.08, 0.18),
    development_pace: (0.3, 0.8),
};

const REALISTIC_BANDS: ParameterBands = ParameterBands {
    market_sentiment: (-0.4, 0.5),
    adoption_rate: (0.6, 1.5),
    competition_pressure: (0.2, 0.7),
    validator_reliability: (0.80, 0.95),
    attack_probability: (0.02, 0.12),
    governance_engagement: (0.35, 0.70),
    shock_probability: (0.03, 0.10),
    development_pace: (0.7, 1.4),
};

const OPTIMISTIC_BANDS: ParameterBands = ParameterBands {
    market_sentiment: (0.2, 0.9),
    adoption_rate: (1.5, 3.0),
    competition_pressure: (0.05, 0.4),
    validator_reliability: (0.90, 0.99),
    attack_probability: (0.01, 0.08),
    governance_engagement: (0.60, 0.90),
    shock_probability: (0.01, 0.06),
    development_pace: (1.2, 2.0),
};

pub fn parameter_bands(scenario: Scenario) -> &'static ParameterBands {
    match scenario {
        Scenario::Default => &DEFAULT_BANDS,
        Scenario::Pessimistic => &PESSIMISTIC_BANDS,
        Scenario::Realistic => &REALISTIC_BANDS,
        Scenario::Optimistic => &OPTIMISTIC_BANDS,
    }
}

/// Draws one parameter set. Fields are drawn in declaration order.
pub fn sample_parameters(scenario: Scenario, rng: &mut SimRng) -> ParameterSet {
    let bands = parameter_bands(scenario);
    let mut draw = |(low, high): (f64, f64)| rng.uniform(low, high);
    ParameterSet {
        market_sentiment: draw(bands.market_sentiment),
        adoption_rate: draw(bands.adoption_rate),
        competition_pressure: draw(bands.competition_pressure),
        validator_reliability: draw(bands.validator_reliability),
        attack_probability: draw(bands.attack_probability),
        governance_engagement: draw(bands.governance_engagement),
        shock_probability: draw(bands.shock_probability),
        development_pace: draw(bands.development_pace),
    }
}

pub fn initial_state(scenario: Scenario) -> StateSnapshot {
    let genesis = StateSnapshot::default();
    match scenario {
        Scenario::Default => genesis,
        Scenario::Pessimistic => StateSnapshot {
            active_accounts: 300,
            num_validators: 15,
            total_staked: 300_000.0,
            transactions_per_day: 200.0,
            token_price_usd: 0.05,
            governance_participation: 0.35,
            largest_stake_share: 0.20,
            ..genesis
        },
        Scenario::Realistic => StateSnapshot {
            active_accounts: 800,
            num_validators: 30,
            total_staked: 700_000.0,
            transactions_per_day: 800.0,
            token_price_usd: 0.10,
            governance_participation: 0.50,
            largest_stake_share: 0.15,
            ..genesis
        },
        Scenario::Optimistic => StateSnapshot {
            active_accounts: 2_000,
            num_validators: 50,
            total_staked: 1_500_000.0,
            transactions_per_day: 2_000.0,
            token_price_usd: 0.20,
            governance_participation: 0.60,
            largest_stake_share: 0.10,
            ..genesis
        },
    }
}

pub fn prepare_run(
    scenario: Scenario,
    overrides: &ScenarioOverrides,
    rng: &mut SimRng,
) -> (ParameterSet, StateSnapshot) {
    let mut params = sample_parameters(scenario, rng);
    if let Some(band) = overrides.adoption_range {
        params.adoption_rate = band.sample(rng);
    }
    if let Some(band) = overrides.competition_range {
        params.competition_pressure = band.sample(rng);
    }

    let mut state = initial_state(scenario);
    if let Some(accounts) = overrides.initial_accounts {
        state.active_accounts = accounts;
    }
    if let Some(validators) = overrides.initial_validators {
        state.num_validators = validators;
        state.total_staked = f64::from(validators) * MIN_VALIDATOR_STAKE;
    }

    (params, state)
}
