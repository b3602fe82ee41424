//! Projection results
//!
//! Everything here is produced once, at the end of a run, and never mutated
//! by the engine afterwards.

use serde::{Deserialize, Serialize};

use super::allocation::Allocation;
use super::spending::{GuardrailAction, SpendingClamp};
use crate::statistics;

/// Complete breakdown of one simulated year of one trajectory
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YearRecord {
    /// Calendar year
    pub year: i32,
    pub age: u32,
    pub weights: Allocation,
    pub portfolio_return: f64,
    pub start_balance: f64,
    /// Baseline spending target chosen by the spending policy
    pub spending_target: f64,
    pub guardrail_action: GuardrailAction,
    pub clamp: SpendingClamp,
    pub stream_expenses: f64,
    /// Non-Social-Security income from streams
    pub other_income: f64,
    pub social_security: f64,
    /// Cash the portfolio must supply after tax (never negative)
    pub net_need: f64,
    pub gross_withdrawal: f64,
    /// Amount actually taken from the portfolio (`gross_withdrawal` capped by the balance)
    pub withdrawn: f64,
    /// Gross withdrawal the portfolio could not cover
    pub shortfall: f64,
    pub tax: f64,
    pub windfall: f64,
    pub growth: f64,
    pub end_balance: f64,
    /// Gross withdrawal divided by start balance
    pub withdrawal_rate: f64,
    pub depleted: bool,
}

impl YearRecord {
    /// Record for a year spent in the absorbing depleted state
    #[must_use]
    pub fn depleted(year: i32, age: u32, weights: Allocation) -> Self {
        Self {
            year,
            age,
            weights,
            depleted: true,
            ..Default::default()
        }
    }
}

/// Year-by-year history of a single trajectory
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathDetail {
    pub start_capital: f64,
    pub years: Vec<YearRecord>,
}

impl PathDetail {
    /// Terminal wealth recomputed from the path's own flows.
    ///
    /// Depletion is re-applied the same way the engine does it, so the result
    /// matches `terminal_wealth()` exactly.
    #[must_use]
    pub fn reconciled_terminal(&self) -> f64 {
        self.years.iter().fold(self.start_capital, |balance, y| {
            let end = balance - y.withdrawn + y.windfall + y.growth;
            if end <= 0.0 { 0.0 } else { end }
        })
    }

    #[must_use]
    pub fn terminal_wealth(&self) -> f64 {
        self.years
            .last()
            .map_or(self.start_capital, |y| y.end_balance)
    }

    /// Wealth at each timestep, `years.len() + 1` entries
    #[must_use]
    pub fn wealth_path(&self) -> Vec<f64> {
        std::iter::once(self.start_capital)
            .chain(self.years.iter().map(|y| y.end_balance))
            .collect()
    }

    #[must_use]
    pub fn guardrail_hits(&self) -> u32 {
        self.years
            .iter()
            .filter(|y| y.guardrail_action.is_trigger())
            .count() as u32
    }

    /// Index of the simulated year in which the balance reached zero
    #[must_use]
    pub fn depletion_year(&self) -> Option<u32> {
        self.years
            .iter()
            .position(|y| y.depleted)
            .map(|i| i as u32)
    }
}

/// A real trajectory selected by its terminal-wealth rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentilePath {
    pub percentile: u32,
    pub simulation_index: usize,
    pub path: PathDetail,
}

/// Per-trajectory, per-year diagnostics. Row = simulation, column = simulated year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct YearlyDiagnostics {
    pub gross_withdrawal: Vec<Vec<f64>>,
    pub tax_paid: Vec<Vec<f64>>,
    pub social_security: Vec<Vec<f64>>,
    pub guardrail_events: Vec<Vec<GuardrailAction>>,
    pub clamp_events: Vec<Vec<SpendingClamp>>,
}

impl YearlyDiagnostics {
    pub(crate) fn push_path(&mut self, path: &PathDetail) {
        self.gross_withdrawal
            .push(path.years.iter().map(|y| y.gross_withdrawal).collect());
        self.tax_paid.push(path.years.iter().map(|y| y.tax).collect());
        self.social_security
            .push(path.years.iter().map(|y| y.social_security).collect());
        self.guardrail_events
            .push(path.years.iter().map(|y| y.guardrail_action).collect());
        self.clamp_events
            .push(path.years.iter().map(|y| y.clamp).collect());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
}

/// Nearest-rank percentile of wealth at every timestep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    pub percentile: f64,
    pub values: Vec<f64>,
}

/// Output of a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    /// `num_simulations` rows of `horizon_years + 1` columns; column 0 is the start capital
    pub wealth_paths: Vec<Vec<f64>>,
    pub diagnostics: YearlyDiagnostics,
    pub terminal_wealth: Vec<f64>,
    pub depletion_year: Vec<Option<u32>>,
    pub guardrail_hits: Vec<u32>,
    /// Fraction of trajectories with wealth > 0 at every timestep
    pub success_rate: f64,
    pub stats: SummaryStats,
    /// Trajectories at the 10th, 50th and 90th terminal-wealth percentile
    pub percentile_paths: Vec<PercentilePath>,
    /// Number of trajectory-years in which the tax solver fell back to its upper bound
    pub solver_fallbacks: u32,
    /// Master seed the run used
    pub seed: u64,
}

impl SimulationResults {
    #[must_use]
    pub fn num_simulations(&self) -> usize {
        self.wealth_paths.len()
    }

    #[must_use]
    pub fn percentile_path(&self, percentile: u32) -> Option<&PercentilePath> {
        self.percentile_paths
            .iter()
            .find(|p| p.percentile == percentile)
    }

    /// Wealth bands across the time axis, one per requested percentile
    #[must_use]
    pub fn wealth_percentile_bands(&self, percentiles: &[f64]) -> Vec<PercentileBand> {
        let columns = self.wealth_paths.first().map_or(0, Vec::len);
        let sorted_columns: Vec<Vec<f64>> = (0..columns)
            .map(|t| {
                let mut col: Vec<f64> = self.wealth_paths.iter().map(|row| row[t]).collect();
                col.sort_by(f64::total_cmp);
                col
            })
            .collect();

        percentiles
            .iter()
            .map(|&p| PercentileBand {
                percentile: p,
                values: sorted_columns
                    .iter()
                    .map(|col| statistics::percentile_sorted(col, p))
                    .collect(),
            })
            .collect()
    }

    /// Fraction of trajectories ending strictly below `threshold`
    #[must_use]
    pub fn probability_terminal_below(&self, threshold: f64) -> f64 {
        if self.terminal_wealth.is_empty() {
            return 0.0;
        }
        let below = self
            .terminal_wealth
            .iter()
            .filter(|w| **w < threshold)
            .count();
        below as f64 / self.terminal_wealth.len() as f64
    }

    /// Fraction of trajectories still solvent at each timestep
    #[must_use]
    pub fn success_rate_by_year(&self) -> Vec<f64> {
        let n = self.wealth_paths.len();
        if n == 0 {
            return Vec::new();
        }
        let columns = self.wealth_paths[0].len();
        (0..columns)
            .map(|t| {
                let alive = self.wealth_paths.iter().filter(|row| row[t] > 0.0).count();
                alive as f64 / n as f64
            })
            .collect()
    }
}

/// Output of a deterministic projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterministicResults {
    pub path: PathDetail,
    pub wealth_path: Vec<f64>,
    pub guardrail_hits: u32,
    pub depletion_year: Option<u32>,
    pub solver_fallbacks: u32,
}
