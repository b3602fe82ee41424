//! Progressive income tax and the withdrawal gross-up solver
//!
//! Brackets are a simplified combined federal + state table. Taxable income is
//! gross income less the standard deduction, floored at zero. Bracket tables are
//! validated once by `TaxConfig::validate`, so nothing here re-checks ordering.

use crate::error::TaxError;
use crate::model::{TaxBracket, TaxConfig};

/// Multiplier applied to `N / (1 - top_rate)` for the initial upper bound
const UPPER_BOUND_MARGIN: f64 = 1.2;

/// Maximum number of times the upper bound is doubled while bracketing the root
const MAX_BOUND_DOUBLINGS: u32 = 64;

/// Tax owed on `gross_income` after subtracting `deduction`
pub fn calculate_tax(gross_income: f64, deduction: f64, brackets: &[TaxBracket]) -> f64 {
    let taxable = (gross_income - deduction).max(0.0);
    if taxable <= 0.0 {
        return 0.0;
    }

    let mut tax = 0.0;
    for (i, bracket) in brackets.iter().enumerate() {
        if taxable <= bracket.threshold {
            break;
        }
        let next_threshold = brackets
            .get(i + 1)
            .map_or(f64::INFINITY, |b| b.threshold);
        tax += (taxable.min(next_threshold) - bracket.threshold) * bracket.rate;
    }
    tax
}

/// Tax as a fraction of gross income
pub fn effective_tax_rate(gross_income: f64, deduction: f64, brackets: &[TaxBracket]) -> f64 {
    if gross_income <= 0.0 {
        return 0.0;
    }
    calculate_tax(gross_income, deduction, brackets) / gross_income
}

/// Rate applied to the next dollar of gross income
pub fn marginal_tax_rate(gross_income: f64, deduction: f64, brackets: &[TaxBracket]) -> f64 {
    let taxable = gross_income - deduction;
    if taxable < 0.0 {
        return 0.0;
    }
    brackets
        .iter()
        .take_while(|b| taxable >= b.threshold)
        .last()
        .map_or(0.0, |b| b.rate)
}

/// Solved gross withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GrossUp {
    pub gross: f64,
    /// Total tax on `other_taxable_income + gross`
    pub tax: f64,
    /// Bisection iterations used
    pub iterations: usize,
}

impl GrossUp {
    /// Gross-up evaluated at a fixed gross amount (used for solver fallbacks)
    #[must_use]
    pub fn at(gross: f64, other_taxable_income: f64, config: &TaxConfig) -> Self {
        Self {
            gross,
            tax: calculate_tax(
                other_taxable_income + gross,
                config.standard_deduction,
                &config.brackets,
            ),
            iterations: 0,
        }
    }
}

/// Minimum gross withdrawal `G` with `G - tax(other + G) = net_need`.
///
/// Bisection between `net_need` (no tax) and a generous upper bound that is
/// doubled until it brackets the root. Net proceeds are strictly increasing in
/// `G` because every rate is below 1, so the root is unique.
pub fn solve_gross_withdrawal(
    net_need: f64,
    other_taxable_income: f64,
    config: &TaxConfig,
) -> Result<GrossUp, TaxError> {
    if net_need <= 0.0 {
        return Ok(GrossUp::default());
    }

    let tolerance = config.solver.tolerance;
    let tax_at = |gross: f64| {
        calculate_tax(
            other_taxable_income + gross,
            config.standard_deduction,
            &config.brackets,
        )
    };
    let residual = |gross: f64| gross - tax_at(gross) - net_need;

    let mut lo = net_need;
    if residual(lo).abs() < tolerance {
        return Ok(GrossUp {
            gross: lo,
            tax: tax_at(lo),
            iterations: 0,
        });
    }

    let mut hi = net_need / (1.0 - config.top_rate()) * UPPER_BOUND_MARGIN;
    let mut doublings = 0;
    while residual(hi) < 0.0 {
        if doublings == MAX_BOUND_DOUBLINGS {
            return Err(TaxError::NonConvergence {
                net_need,
                iterations: 0,
                last_gross: hi,
            });
        }
        hi *= 2.0;
        doublings += 1;
    }

    for iteration in 1..=config.solver.max_iterations {
        let mid = f64::midpoint(lo, hi);
        let r = residual(mid);
        if r.abs() < tolerance {
            return Ok(GrossUp {
                gross: mid,
                tax: tax_at(mid),
                iterations: iteration,
            });
        }
        if r < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(TaxError::NonConvergence {
        net_need,
        iterations: config.solver.max_iterations,
        last_gross: hi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilingStatus, StateTaxPreset};
    use proptest::prelude::*;

    fn brackets(pairs: &[(f64, f64)]) -> Vec<TaxBracket> {
        pairs
            .iter()
            .map(|&(threshold, rate)| TaxBracket { threshold, rate })
            .collect()
    }

    fn config(pairs: &[(f64, f64)], deduction: f64) -> TaxConfig {
        TaxConfig {
            standard_deduction: deduction,
            brackets: brackets(pairs),
            ..TaxConfig::default()
        }
    }

    #[test]
    fn test_calculate_tax_progressive() {
        let b = brackets(&[(0.0, 0.10), (50_000.0, 0.22)]);
        assert_eq!(calculate_tax(20_000.0, 25_000.0, &b), 0.0);
        assert!((calculate_tax(45_000.0, 25_000.0, &b) - 2_000.0).abs() < 1e-9);
        // 50k at 10% + 25k at 22%
        let tax = calculate_tax(100_000.0, 25_000.0, &b);
        assert!((tax - 10_500.0).abs() < 1e-9, "Expected 10500, got {tax}");
    }

    #[test]
    fn test_mfj_tax() {
        let cfg = TaxConfig::for_filing_status(FilingStatus::MarriedFilingJointly);
        // taxable 170_800: 94_300 * 0.10 + 76_500 * 0.22
        let tax = calculate_tax(200_000.0, cfg.standard_deduction, &cfg.brackets);
        assert!((tax - 26_260.0).abs() < 0.01, "Expected 26260, got {tax}");
    }

    #[test]
    fn test_rates() {
        let b = brackets(&[(0.0, 0.10), (50_000.0, 0.22)]);
        assert_eq!(marginal_tax_rate(10_000.0, 25_000.0, &b), 0.0);
        assert_eq!(marginal_tax_rate(40_000.0, 25_000.0, &b), 0.10);
        assert_eq!(marginal_tax_rate(80_000.0, 25_000.0, &b), 0.22);
        assert_eq!(effective_tax_rate(0.0, 25_000.0, &b), 0.0);
        assert!((effective_tax_rate(100_000.0, 25_000.0, &b) - 0.105).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_need_is_free() {
        let cfg = TaxConfig::default();
        assert_eq!(solve_gross_withdrawal(0.0, 50_000.0, &cfg), Ok(GrossUp::default()));
        assert_eq!(solve_gross_withdrawal(-5_000.0, 0.0, &cfg), Ok(GrossUp::default()));
    }

    #[test]
    fn test_under_deduction_needs_no_tax() {
        let cfg = config(&[(0.0, 0.10), (50_000.0, 0.22)], 50_000.0);
        let g = solve_gross_withdrawal(40_000.0, 0.0, &cfg).unwrap();
        assert_eq!(g.gross, 40_000.0);
        assert_eq!(g.tax, 0.0);
        assert_eq!(g.iterations, 0);
    }

    #[test]
    fn test_gross_up_with_other_income() {
        let cfg = config(&[(0.0, 0.10), (50_000.0, 0.22)], 25_000.0);
        let g = solve_gross_withdrawal(30_000.0, 20_000.0, &cfg).unwrap();
        assert!((g.gross - g.tax - 30_000.0).abs() < 0.01);
        let expected_tax = calculate_tax(g.gross + 20_000.0, 25_000.0, &cfg.brackets);
        assert!((g.tax - expected_tax).abs() < 1e-9);
        assert!(g.gross > 30_000.0);
    }

    #[test]
    fn test_other_income_tax_exceeding_initial_bound() {
        // Tax on the other income alone dwarfs the need, forcing bound doubling
        let cfg = TaxConfig::for_state(StateTaxPreset::California, FilingStatus::Single);
        let g = solve_gross_withdrawal(1_000.0, 2_000_000.0, &cfg).unwrap();
        assert!((g.gross - g.tax - 1_000.0).abs() < 0.01);
    }

    #[test]
    fn test_non_convergence_reports_upper_bound() {
        let mut cfg = TaxConfig::default();
        cfg.solver.max_iterations = 1;
        cfg.solver.tolerance = 1e-12;
        match solve_gross_withdrawal(150_000.0, 0.0, &cfg) {
            Err(TaxError::NonConvergence {
                iterations,
                last_gross,
                ..
            }) => {
                assert_eq!(iterations, 1);
                let fallback = GrossUp::at(last_gross, 0.0, &cfg);
                // Upper bound always over-withdraws
                assert!(fallback.gross - fallback.tax >= 150_000.0);
            }
            other => panic!("expected NonConvergence, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_gross_up_round_trip(
            net_need in 1.0f64..2_000_000.0,
            other in 0.0f64..500_000.0,
            single in any::<bool>(),
            state_idx in 0usize..4,
        ) {
            let status = if single { FilingStatus::Single } else { FilingStatus::MarriedFilingJointly };
            let state = [
                StateTaxPreset::FederalOnly,
                StateTaxPreset::California,
                StateTaxPreset::NewYork,
                StateTaxPreset::Illinois,
            ][state_idx];
            let cfg = TaxConfig::for_state(state, status);
            let g = solve_gross_withdrawal(net_need, other, &cfg).unwrap();
            let tax = calculate_tax(other + g.gross, cfg.standard_deduction, &cfg.brackets);
            prop_assert!((g.gross - tax - net_need).abs() < 0.01);
            prop_assert!(g.gross >= net_need);
        }
    }
}
