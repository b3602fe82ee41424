//! Deterministic projection
//!
//! A single trajectory in which every asset class returns exactly its
//! (regime-adjusted) mean. It runs through the same pipeline as the Monte
//! Carlo engine with an [`ExpectedReturns`] shock source.

use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::model::DeterministicResults;
use crate::pipeline::{RunPlan, run_trajectory};
use crate::returns::ExpectedReturns;

pub fn project_deterministic(
    config: &SimulationConfig,
) -> Result<DeterministicResults, SimulationError> {
    let plan = RunPlan::new(config)?;
    debug!(
        horizon_years = config.horizon_years,
        start_capital = config.start_capital,
        "Starting deterministic projection"
    );

    let state = run_trajectory(&plan, &mut ExpectedReturns, 0)?;
    let solver_fallbacks = state.solver_fallbacks;
    let path = state.into_path(config.start_capital);

    let results = DeterministicResults {
        wealth_path: path.wealth_path(),
        guardrail_hits: path.guardrail_hits(),
        depletion_year: path.depletion_year(),
        solver_fallbacks,
        path,
    };

    info!(
        terminal_wealth = results.path.terminal_wealth(),
        guardrail_hits = results.guardrail_hits,
        depleted = results.depletion_year.is_some(),
        "Deterministic projection complete"
    );
    Ok(results)
}
