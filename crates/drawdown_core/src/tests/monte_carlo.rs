//! Tests for the Monte Carlo engine
//!
//! These tests verify:
//! - Bit-identical results for a fixed seed, regardless of thread count
//! - Depletion is absorbing
//! - Percentile paths are real trajectories whose flows reconcile

use super::base_config;
use crate::config::SimulationConfig;
use crate::model::{MarketRegime, SpendingPolicy};
use crate::simulation::simulate_monte_carlo;
use crate::statistics;

fn stressed_config() -> SimulationConfig {
    SimulationConfig {
        spending: SpendingPolicy::FixedAnnual {
            annual_spending: 140_000.0,
        },
        regime: MarketRegime::LongBear,
        ..base_config()
    }
}

#[test]
fn test_fixed_seed_is_bit_identical() {
    let config = base_config();
    let a = simulate_monte_carlo(&config).unwrap();
    let b = simulate_monte_carlo(&config).unwrap();
    assert_eq!(a.wealth_paths, b.wealth_paths);
    assert_eq!(a.diagnostics, b.diagnostics);
    assert_eq!(a.percentile_paths, b.percentile_paths);
}

#[test]
fn test_different_seeds_differ() {
    let a = simulate_monte_carlo(&base_config()).unwrap();
    let b = simulate_monte_carlo(&SimulationConfig {
        seed: Some(43),
        ..base_config()
    })
    .unwrap();
    assert_ne!(a.wealth_paths, b.wealth_paths);
}

#[cfg(feature = "parallel")]
#[test]
fn test_thread_count_does_not_change_results() {
    let config = stressed_config();
    let parallel = simulate_monte_carlo(&config).unwrap();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let sequential = pool.install(|| simulate_monte_carlo(&config)).unwrap();
    assert_eq!(parallel.wealth_paths, sequential.wealth_paths);
    assert_eq!(parallel.percentile_paths, sequential.percentile_paths);
}

#[test]
fn test_depletion_is_absorbing() {
    let r = simulate_monte_carlo(&stressed_config()).unwrap();
    let depleted: Vec<(usize, u32)> = r
        .depletion_year
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.map(|y| (i, y)))
        .collect();
    assert!(!depleted.is_empty(), "stress scenario should deplete some paths");

    for (sim, year) in depleted {
        let year = year as usize;
        // wealth column year+1 is the end of the depleting year
        assert!(r.wealth_paths[sim][year + 1..].iter().all(|w| *w == 0.0));
        assert!(r.diagnostics.gross_withdrawal[sim][year + 1..].iter().all(|w| *w == 0.0));
        assert!(r.diagnostics.tax_paid[sim][year + 1..].iter().all(|t| *t == 0.0));
        assert!(r.wealth_paths[sim][..=year].iter().all(|w| *w > 0.0));
    }
}

#[test]
fn test_success_rate_matches_depletions() {
    let r = simulate_monte_carlo(&stressed_config()).unwrap();
    let survivors = r.depletion_year.iter().filter(|d| d.is_none()).count();
    assert_eq!(r.success_rate, survivors as f64 / r.num_simulations() as f64);
    assert_eq!(*r.success_rate_by_year().last().unwrap(), r.success_rate);
}

#[test]
fn test_percentile_paths_are_exact_trajectories() {
    let r = simulate_monte_carlo(&stressed_config()).unwrap();
    let ranked = statistics::rank_indices(&r.terminal_wealth);

    for p in &r.percentile_paths {
        assert_eq!(
            Some(p.simulation_index),
            statistics::percentile_index(&ranked, f64::from(p.percentile))
        );
        assert_eq!(p.path.wealth_path(), r.wealth_paths[p.simulation_index]);
        let gross: Vec<f64> = p.path.years.iter().map(|y| y.gross_withdrawal).collect();
        assert_eq!(gross, r.diagnostics.gross_withdrawal[p.simulation_index]);
    }
}

#[test]
fn test_percentile_paths_reconcile_to_terminal_wealth() {
    for config in [base_config(), stressed_config()] {
        let r = simulate_monte_carlo(&config).unwrap();
        for p in &r.percentile_paths {
            let terminal = r.terminal_wealth[p.simulation_index];
            let reconciled = p.path.reconciled_terminal();
            assert!(
                (reconciled - terminal).abs() <= 1e-6 * terminal.abs().max(1.0),
                "P{}: reconciled {reconciled} vs terminal {terminal}",
                p.percentile
            );
        }
    }
}

#[test]
fn test_percentile_paths_are_ordered() {
    let r = simulate_monte_carlo(&base_config()).unwrap();
    let p10 = r.percentile_path(10).unwrap().path.terminal_wealth();
    let p50 = r.percentile_path(50).unwrap().path.terminal_wealth();
    let p90 = r.percentile_path(90).unwrap().path.terminal_wealth();
    assert!(p10 <= p50 && p50 <= p90);
    assert_eq!(r.stats.p10, p10);
    assert_eq!(r.stats.p50, p50);
    assert_eq!(r.stats.p90, p90);
}

#[test]
fn test_wealth_paths_have_horizon_plus_one_columns() {
    let config = SimulationConfig {
        horizon_years: 1,
        num_simulations: 5,
        ..base_config()
    };
    let r = simulate_monte_carlo(&config).unwrap();
    assert!(r.wealth_paths.iter().all(|row| row.len() == 2));
    assert!(r.diagnostics.social_security.iter().all(|row| row.len() == 1));
}
