//! Tests for tax solver non-convergence handling inside a run

use super::base_config;
use crate::config::SimulationConfig;
use crate::deterministic::project_deterministic;
use crate::error::{SimulationError, TaxError};
use crate::model::{SolverFallback, SpendingPolicy};
use crate::simulation::simulate_monte_carlo;
use crate::taxes::calculate_tax;

/// Settings the bisection cannot satisfy in a single step
fn starved_solver(fallback: SolverFallback) -> SimulationConfig {
    let mut config = SimulationConfig {
        horizon_years: 5,
        num_simulations: 10,
        spending: SpendingPolicy::FixedAnnual {
            annual_spending: 120_000.0,
        },
        ..base_config()
    };
    config.tax.solver.max_iterations = 1;
    config.tax.solver.tolerance = 1e-12;
    config.tax.solver.on_non_convergence = fallback;
    config
}

#[test]
fn test_upper_bound_fallback_is_counted_and_conservative() {
    let config = starved_solver(SolverFallback::UpperBound);
    let det = project_deterministic(&config).unwrap();
    assert_eq!(det.solver_fallbacks, 5);
    for y in &det.path.years {
        // over-withdraws: net proceeds cover the need
        assert!(y.gross_withdrawal - y.tax >= y.net_need);
        let tax = calculate_tax(
            y.gross_withdrawal,
            config.tax.standard_deduction,
            &config.tax.brackets,
        );
        assert_eq!(y.tax, tax);
    }

    let mc = simulate_monte_carlo(&config).unwrap();
    assert_eq!(mc.solver_fallbacks, 50);
}

#[test]
fn test_fail_fallback_aborts_run() {
    let config = starved_solver(SolverFallback::Fail);
    match simulate_monte_carlo(&config) {
        Err(SimulationError::TaxSolver {
            simulation_index,
            year,
            source: TaxError::NonConvergence { iterations, .. },
        }) => {
            assert_eq!(simulation_index, 0);
            assert_eq!(year, 2025);
            assert_eq!(iterations, 1);
        }
        other => panic!("expected TaxSolver error, got {other:?}"),
    }
    assert!(matches!(
        project_deterministic(&config),
        Err(SimulationError::TaxSolver { .. })
    ));
}

#[test]
fn test_default_solver_never_falls_back() {
    let config = SimulationConfig {
        num_simulations: 50,
        ..base_config()
    };
    let r = simulate_monte_carlo(&config).unwrap();
    assert_eq!(r.solver_fallbacks, 0);
}
