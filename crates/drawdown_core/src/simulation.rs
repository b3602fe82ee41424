//! Monte Carlo engine
//!
//! The outer loop walks the years; the inner loop advances every trajectory by
//! one year (in parallel with the `parallel` feature). Each trajectory owns its
//! shock source, seeded from a per-trajectory seed drawn sequentially from the
//! master seed, so results do not depend on how the inner loop is scheduled.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::model::{PercentilePath, SimulationResults, YearlyDiagnostics};
use crate::pipeline::{RunPlan, TrajectoryState, advance_year};
use crate::returns::{GaussianShocks, ShockSource};
use crate::statistics::{self, PATH_PERCENTILES};

struct Trajectory<S> {
    index: usize,
    shocks: S,
    state: TrajectoryState,
}

impl<S: ShockSource> Trajectory<S> {
    fn advance(&mut self, plan: &RunPlan<'_>, year_index: usize) -> Result<(), SimulationError> {
        advance_year(plan, &mut self.state, &mut self.shocks, year_index, self.index)
    }
}

/// Run `config.num_simulations` trajectories with Gaussian shocks.
///
/// Uses `config.seed` when set; otherwise a fresh seed is drawn and reported
/// in the results.
pub fn simulate_monte_carlo(config: &SimulationConfig) -> Result<SimulationResults, SimulationError> {
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut master = SmallRng::seed_from_u64(seed);
    simulate_monte_carlo_with(config, seed, |_| GaussianShocks::from_seed(master.next_u64()))
}

/// Run the Monte Carlo engine with caller-supplied shock sources.
///
/// `make_shocks` is called once per trajectory, in index order, before the
/// year loop starts.
pub fn simulate_monte_carlo_with<S, F>(
    config: &SimulationConfig,
    seed: u64,
    mut make_shocks: F,
) -> Result<SimulationResults, SimulationError>
where
    S: ShockSource + Send,
    F: FnMut(usize) -> S,
{
    let plan = RunPlan::new(config)?;
    let n = config.num_simulations;
    debug!(
        num_simulations = n,
        horizon_years = config.horizon_years,
        seed,
        "Starting Monte Carlo simulation"
    );

    let mut trajectories: Vec<Trajectory<S>> = (0..n)
        .map(|index| Trajectory {
            index,
            shocks: make_shocks(index),
            state: TrajectoryState::new(config.start_capital, plan.horizon()),
        })
        .collect();

    for year_index in 0..plan.horizon() {
        advance_all(&mut trajectories, &plan, year_index)?;
    }

    let results = collect_results(config, seed, trajectories);
    info!(
        success_rate = results.success_rate,
        median_terminal = results.stats.p50,
        solver_fallbacks = results.solver_fallbacks,
        "Monte Carlo simulation complete"
    );
    Ok(results)
}

#[cfg(feature = "parallel")]
fn advance_all<S: ShockSource + Send>(
    trajectories: &mut [Trajectory<S>],
    plan: &RunPlan<'_>,
    year_index: usize,
) -> Result<(), SimulationError> {
    // Lowest failing index wins, whatever the thread interleaving
    let failure = trajectories
        .par_iter_mut()
        .filter_map(|t| t.advance(plan, year_index).err())
        .min_by_key(failure_index);
    failure.map_or(Ok(()), Err)
}

#[cfg(not(feature = "parallel"))]
fn advance_all<S: ShockSource + Send>(
    trajectories: &mut [Trajectory<S>],
    plan: &RunPlan<'_>,
    year_index: usize,
) -> Result<(), SimulationError> {
    trajectories
        .iter_mut()
        .try_for_each(|t| t.advance(plan, year_index))
}

#[cfg(feature = "parallel")]
fn failure_index(e: &SimulationError) -> usize {
    match e {
        SimulationError::TaxSolver {
            simulation_index, ..
        } => *simulation_index,
        SimulationError::Config(_) => 0,
    }
}

fn collect_results<S>(
    config: &SimulationConfig,
    seed: u64,
    trajectories: Vec<Trajectory<S>>,
) -> SimulationResults {
    let n = trajectories.len();
    let mut wealth_paths = Vec::with_capacity(n);
    let mut terminal_wealth = Vec::with_capacity(n);
    let mut depletion_year = Vec::with_capacity(n);
    let mut guardrail_hits = Vec::with_capacity(n);
    let mut diagnostics = YearlyDiagnostics::default();
    let mut solver_fallbacks = 0;

    let paths: Vec<_> = trajectories
        .into_iter()
        .map(|t| {
            solver_fallbacks += t.state.solver_fallbacks;
            t.state.into_path(config.start_capital)
        })
        .collect();

    for path in &paths {
        wealth_paths.push(path.wealth_path());
        terminal_wealth.push(path.terminal_wealth());
        depletion_year.push(path.depletion_year());
        guardrail_hits.push(path.guardrail_hits());
        diagnostics.push_path(path);
    }

    let ranked = statistics::rank_indices(&terminal_wealth);
    let percentile_paths = PATH_PERCENTILES
        .iter()
        .filter_map(|&p| {
            statistics::percentile_index(&ranked, f64::from(p)).map(|simulation_index| {
                PercentilePath {
                    percentile: p,
                    simulation_index,
                    path: paths[simulation_index].clone(),
                }
            })
        })
        .collect();

    SimulationResults {
        success_rate: statistics::success_rate(&wealth_paths),
        stats: statistics::summarize(&terminal_wealth),
        wealth_paths,
        diagnostics,
        terminal_wealth,
        depletion_year,
        guardrail_hits,
        percentile_paths,
        solver_fallbacks,
        seed,
    }
}
