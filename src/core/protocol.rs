// Token economics
pub const GENESIS_SUPPLY: f64 = 1_000_000_000.0;
pub const INITIAL_EMISSION_RATE: f64 = 0.05;
pub const MIN_EMISSION_RATE: f64 = 0.005;
pub const INITIAL_BURN_RATE: f64 = 0.01;
pub const MAX_BURN_RATE: f64 = 0.035;
pub const EMISSION_HALF_LIFE_YEARS: f64 = 5.0;
pub const BURN_GROWTH_SPEED: f64 = 0.25;
pub const BURN_VOLUME_REFERENCE_TX: f64 = 10_000.0;
pub const MAX_BURN_VOLUME_FACTOR: f64 = 2.0;

pub const INITIAL_CIRCULATING_SHARE: f64 = 0.5;
pub const INITIAL_TREASURY_SHARE: f64 = 0.10;
pub const INITIAL_RESERVE_SHARE: f64 = 0.10;
pub const CIRCULATING_SHARE: f64 = 0.6;

// Emission distribution
pub const VALIDATOR_SHARE: f64 = 0.70;
pub const TREASURY_SHARE: f64 = 0.20;
pub const RESERVE_SHARE: f64 = 0.10;

pub const MAX_TREASURY_SPEND_SHARE: f64 = 0.30;
pub const DEVELOPMENT_SPEND_SHARE: f64 = 0.15;

// Validators
pub const MIN_VALIDATOR_STAKE: f64 = 10_000.0;
pub const MIN_BFT_VALIDATORS: u32 = 4;

// Slashing. Not applied by the yearly step.
pub const CRITICAL_SLASH_VC: f64 = 0.50;
pub const CRITICAL_SLASH_STAKE: f64 = 0.20;
pub const HIGH_SLASH_VC: f64 = 0.25;
pub const HIGH_SLASH_STAKE: f64 = 0.05;

// Governance
pub const SUPERMAJORITY_THRESHOLD: f64 = 0.66;
pub const STANDARD_THRESHOLD: f64 = 0.50;
pub const MIN_QUORUM: f64 = 0.30;
pub const BASE_PROPOSALS_PER_YEAR: f64 = 4.0;
pub const MAX_PROPOSALS_PER_YEAR: u64 = 1_000;

// Network floors
pub const MIN_ACTIVE_ACCOUNTS: u64 = 100;
pub const MIN_TRANSACTIONS_PER_DAY: f64 = 10.0;
pub const MIN_TOKEN_PRICE_USD: f64 = 0.001;

// Failure thresholds
pub const HYPERINFLATION_SUPPLY_MULTIPLE: f64 = 12.0;
pub const DEFLATION_SUPPLY_MULTIPLE: f64 = 0.3;
pub const MAX_SUCCESSFUL_ATTACKS: u32 = 3;
pub const ADOPTION_CHECK_YEAR: u32 = 5;
pub const MIN_ACCOUNTS_AFTER_LAUNCH: u64 = 2_000;
pub const MIN_TREASURY_EMISSION_SHARE: f64 = 0.01;
pub const LIQUIDITY_GRACE_YEARS: u32 = 2;
pub const MAX_LARGEST_STAKE_SHARE: f64 = 0.50;
pub const DEADLOCK_MIN_PROPOSALS: u64 = 10;
pub const DEADLOCK_FAILURE_RATE: f64 = 0.80;
pub const DEADLOCK_GRACE_YEARS: u32 = 3;

/// Annual emission rate, decaying from 5% toward a 0.5% floor with a five-year half-life.
pub fn emission_rate(years: f64) -> f64 {
    let decay_constant = std::f64::consts::LN_2 / EMISSION_HALF_LIFE_YEARS;
    let decay_factor = (-decay_constant * years).exp();
    let rate = MIN_EMISSION_RATE + (INITIAL_EMISSION_RATE - MIN_EMISSION_RATE) * decay_factor;
    rate.clamp(MIN_EMISSION_RATE, INITIAL_EMISSION_RATE)
}

/// Annual burn rate, rising from 1% toward a 3.5% ceiling.
pub fn burn_rate(years: f64) -> f64 {
    let growth_factor = (-BURN_GROWTH_SPEED * years).exp();
    let rate = MAX_BURN_RATE - (MAX_BURN_RATE - INITIAL_BURN_RATE) * growth_factor;
    rate.clamp(INITIAL_BURN_RATE, MAX_BURN_RATE)
}
