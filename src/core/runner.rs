use super::config::SimulationConfig;
use super::engine::step;
use super::rng::SimRng;
use super::scenario::prepare_run;
use super::types::{ParameterSet, RunRecord, StateSnapshot};

#[derive(Debug, Clone)]
pub struct RunResult {
    pub success: bool,
    pub terminal: StateSnapshot,
    pub history: Vec<StateSnapshot>,
}

// history[0] is the starting state; stepping stops after the first failed year.
pub fn run_simulation(
    initial: StateSnapshot,
    params: &ParameterSet,
    horizon_years: u32,
    rng: &mut SimRng,
) -> RunResult {
    let mut history = Vec::with_capacity(horizon_years as usize + 1);
    history.push(initial);

    let mut state = initial;
    for year in 1..=horizon_years {
        state = step(&state, params, year, rng);
        history.push(state);
        if state.failed() {
            break;
        }
    }

    RunResult {
        success: !state.failed(),
        terminal: state,
        history,
    }
}

pub fn simulate_run(config: &SimulationConfig, run_id: u32) -> RunRecord {
    let mut rng = SimRng::for_run(config.seed, run_id);
    let (params, initial) = prepare_run(config.scenario, &config.overrides, &mut rng);
    let result = run_simulation(initial, &params, config.horizon_years, &mut rng);

    RunRecord {
        run_id,
        success: result.success,
        terminal: result.terminal,
        history: result.history,
        params,
    }
}

pub fn run_yearly_trace(config: &SimulationConfig, run_id: u32) -> Vec<StateSnapshot> {
    simulate_run(config, run_id).history
}
