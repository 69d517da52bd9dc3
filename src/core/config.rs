use serde::Serialize;
use thiserror::Error;

use super::protocol::MIN_BFT_VALIDATORS;
use super::rng::SimRng;
use super::types::Scenario;

pub const DEFAULT_NUM_RUNS: u32 = 1_000;
pub const DEFAULT_HORIZON_YEARS: u32 = 50;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("number of simulations must be > 0")]
    ZeroRuns,
    #[error("horizon must be at least one year")]
    ZeroHorizon,
    #[error("{field} band must be finite with low <= high (got {low}..{high})")]
    InvalidBand {
        field: &'static str,
        low: f64,
        high: f64,
    },
    #[error("adoption band must be non-negative (got {low}..{high})")]
    NegativeAdoption { low: f64, high: f64 },
    #[error("competition band must lie within [0, 1] (got {low}..{high})")]
    CompetitionOutOfRange { low: f64, high: f64 },
    #[error("initial accounts must be > 0")]
    ZeroAccounts,
    #[error("initial validators must be >= {min} (got {got})")]
    TooFewValidators { got: u32, min: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingBand {
    low: f64,
    high: f64,
}

impl SamplingBand {
    pub fn new(field: &'static str, low: f64, high: f64) -> Result<Self, ConfigError> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ConfigError::InvalidBand { field, low, high });
        }
        Ok(Self { low, high })
    }

    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        rng.uniform(self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOverrides {
    pub initial_accounts: Option<u64>,
    /// Also resets the starting stake to `count * MIN_VALIDATOR_STAKE`.
    pub initial_validators: Option<u32>,
    pub adoption_range: Option<SamplingBand>,
    pub competition_range: Option<SamplingBand>,
}

impl ScenarioOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_accounts == Some(0) {
            return Err(ConfigError::ZeroAccounts);
        }
        if let Some(got) = self.initial_validators {
            if got < MIN_BFT_VALIDATORS {
                return Err(ConfigError::TooFewValidators {
                    got,
                    min: MIN_BFT_VALIDATORS,
                });
            }
        }
        if let Some(band) = self.adoption_range {
            SamplingBand::new("adoption", band.low, band.high)?;
            if band.low < 0.0 {
                return Err(ConfigError::NegativeAdoption {
                    low: band.low,
                    high: band.high,
                });
            }
        }
        if let Some(band) = self.competition_range {
            SamplingBand::new("competition", band.low, band.high)?;
            if band.low < 0.0 || band.high > 1.0 {
                return Err(ConfigError::CompetitionOutOfRange {
                    low: band.low,
                    high: band.high,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub scenario: Scenario,
    pub num_runs: u32,
    pub horizon_years: u32,
    pub seed: u64,
    pub overrides: ScenarioOverrides,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::Default,
            num_runs: DEFAULT_NUM_RUNS,
            horizon_years: DEFAULT_HORIZON_YEARS,
            seed: DEFAULT_SEED,
            overrides: ScenarioOverrides::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(
        scenario: Scenario,
        num_runs: u32,
        horizon_years: u32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            scenario,
            num_runs,
            horizon_years,
            seed,
            overrides: ScenarioOverrides::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(self, overrides: ScenarioOverrides) -> Result<Self, ConfigError> {
        let config = Self { overrides, ..self };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_runs == 0 {
            return Err(ConfigError::ZeroRuns);
        }
        if self.horizon_years == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        self.overrides.validate()
    }
}
