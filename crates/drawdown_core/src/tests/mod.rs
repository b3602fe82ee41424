//! Integration tests for the drawdown projection engine
//!
//! Tests are organized by topic:
//! - `monte_carlo` - Determinism, absorption and percentile path extraction
//! - `deterministic` - Expected-return projection and its Monte Carlo equivalence
//! - `social_security` - Benefit timing anchored on retirement age
//! - `cash_flows` - Overlapping income and expense streams
//! - `guardrails` - Guardrail triggers and floor/ceiling clamps in the year loop
//! - `tax_solver` - Solver fallback modes inside a run
//! - `validation` - Configuration rejected before simulation starts

mod monte_carlo;
mod social_security;
mod tax_solver;

use crate::config::SimulationConfig;
use crate::model::ReturnAssumptions;

/// Zero every distribution mean so flows are easy to follow by hand
pub(crate) fn flat_returns() -> ReturnAssumptions {
    let mut returns = ReturnAssumptions::default();
    returns.equity.mean = 0.0;
    returns.bonds.mean = 0.0;
    returns.real_estate.mean = 0.0;
    returns.cash.mean = 0.0;
    returns
}

pub(crate) fn base_config() -> SimulationConfig {
    SimulationConfig {
        start_year: 2025,
        horizon_years: 30,
        retirement_age: 65,
        start_capital: 2_000_000.0,
        num_simulations: 200,
        seed: Some(42),
        ..Default::default()
    }
}
