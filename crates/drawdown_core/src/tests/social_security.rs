//! Tests for Social Security timing inside a projection

use super::base_config;
use crate::config::SimulationConfig;
use crate::deterministic::project_deterministic;
use crate::model::{FundingScenario, SocialSecurityConfig, SpendingPolicy};
use crate::simulation::simulate_monte_carlo;

fn config_retiring_at(retirement_age: u32) -> SimulationConfig {
    SimulationConfig {
        retirement_age,
        horizon_years: 40,
        spending: SpendingPolicy::FixedAnnual {
            annual_spending: 60_000.0,
        },
        social_security: Some(SocialSecurityConfig {
            annual_benefit: 36_000.0,
            start_age: 67,
            scenario: FundingScenario::Optimistic,
            ..Default::default()
        }),
        ..base_config()
    }
}

fn first_benefit_offset(config: &SimulationConfig) -> Option<usize> {
    let det = project_deterministic(config).unwrap();
    det.path.years.iter().position(|y| y.social_security > 0.0)
}

#[test]
fn test_early_retiree_waits_twenty_two_years() {
    let config = config_retiring_at(45);
    assert_eq!(first_benefit_offset(&config), Some(22));
    let det = project_deterministic(&config).unwrap();
    assert_eq!(det.path.years[22].year, config.start_year + 22);
    assert_eq!(det.path.years[22].age, 67);
}

#[test]
fn test_standard_retiree_waits_two_years() {
    assert_eq!(first_benefit_offset(&config_retiring_at(65)), Some(2));
}

#[test]
fn test_late_claimant_already_eligible() {
    assert_eq!(first_benefit_offset(&config_retiring_at(68)), Some(0));
}

#[test]
fn test_monte_carlo_diagnostics_share_benefit_timing() {
    let config = SimulationConfig {
        num_simulations: 20,
        ..config_retiring_at(45)
    };
    let r = simulate_monte_carlo(&config).unwrap();
    for (sim, row) in r.diagnostics.social_security.iter().enumerate() {
        if r.depletion_year[sim].is_some_and(|d| d < 22) {
            continue;
        }
        assert_eq!(row[21], 0.0);
        assert_eq!(row[22], 36_000.0);
    }
}

#[test]
fn test_moderate_scenario_reduces_after_2034() {
    let config = SimulationConfig {
        social_security: Some(SocialSecurityConfig {
            annual_benefit: 40_000.0,
            start_age: 65,
            scenario: FundingScenario::Moderate,
            ..Default::default()
        }),
        ..config_retiring_at(65)
    };
    let det = project_deterministic(&config).unwrap();
    let by_year = |year: i32| {
        det.path
            .years
            .iter()
            .find(|y| y.year == year)
            .map(|y| y.social_security)
            .unwrap()
    };
    assert_eq!(by_year(2033), 40_000.0);
    assert!((by_year(2034) - 38_000.0).abs() < 1e-9);
    assert!((by_year(2045) - 36_000.0).abs() < 1e-9);
}
