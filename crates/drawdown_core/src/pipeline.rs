//! Shared per-year pipeline
//!
//! Both engines drive trajectories through [`advance_year`]. Everything that is
//! identical across trajectories (calendar year, age, weights, cash-flow
//! totals, Social Security) is resolved into a [`RunPlan`] before the year loop
//! starts; the loop itself only handles the trajectory-specific parts.
//!
//! Per year, for a trajectory that is not yet depleted:
//! 1. portfolio return from the schedule and the trajectory's shocks
//! 2. spending target from the spending rule
//! 3. net need = target + expenses - income - Social Security, floored at zero
//! 4. gross-up through the tax solver and withdraw
//! 5. windfall deposit, growth, failure check

use tracing::warn;

use crate::cash_flows::total_for_year;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, SimulationError, TaxError};
use crate::model::{Allocation, PathDetail, SolverFallback, YearRecord};
use crate::returns::{ReturnSchedule, ShockSource};
use crate::spending::{PriorYear, SpendingInput, SpendingRule};
use crate::taxes::{GrossUp, solve_gross_withdrawal};

/// Trajectory-independent inputs for one simulated year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearContext {
    pub year: i32,
    pub age: u32,
    pub weights: Allocation,
    pub other_income: f64,
    pub stream_expenses: f64,
    pub social_security: f64,
    pub taxable_social_security: f64,
    pub windfall: f64,
}

/// A validated configuration with every per-run policy resolved
#[derive(Debug, Clone)]
pub struct RunPlan<'a> {
    pub config: &'a SimulationConfig,
    pub schedule: ReturnSchedule,
    pub spending: SpendingRule,
    years: Vec<YearContext>,
}

impl<'a> RunPlan<'a> {
    pub fn new(config: &'a SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let schedule = ReturnSchedule::new(config)?;
        let income_streams = config.all_income_streams();

        let years = (0..config.horizon_years)
            .map(|t| {
                let year = config.calendar_year(t);
                let (social_security, taxable_social_security) = match &config.social_security {
                    Some(ss) => {
                        let benefit = ss
                            .household_benefit(year, config.start_year, config.retirement_age)
                            .total();
                        (benefit, ss.taxable_benefit(benefit))
                    }
                    None => (0.0, 0.0),
                };
                YearContext {
                    year,
                    age: config.retirement_age.saturating_add(t),
                    weights: schedule.year(t as usize).weights,
                    other_income: total_for_year(year, &income_streams),
                    stream_expenses: total_for_year(year, &config.expense_streams),
                    social_security,
                    taxable_social_security,
                    windfall: config.windfall_for_year(year),
                }
            })
            .collect();

        Ok(Self {
            config,
            schedule,
            spending: SpendingRule::new(&config.spending, config.start_capital),
            years,
        })
    }

    #[must_use]
    pub fn year(&self, year_index: usize) -> &YearContext {
        &self.years[year_index]
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.years.len()
    }
}

/// Mutable state private to one trajectory
#[derive(Debug, Clone)]
pub struct TrajectoryState {
    pub balance: f64,
    pub depleted: bool,
    pub prior: Option<PriorYear>,
    pub solver_fallbacks: u32,
    pub records: Vec<YearRecord>,
}

impl TrajectoryState {
    #[must_use]
    pub fn new(start_capital: f64, horizon: usize) -> Self {
        Self {
            balance: start_capital,
            depleted: false,
            prior: None,
            solver_fallbacks: 0,
            records: Vec::with_capacity(horizon),
        }
    }

    #[must_use]
    pub fn into_path(self, start_capital: f64) -> PathDetail {
        PathDetail {
            start_capital,
            years: self.records,
        }
    }
}

/// Run simulated year `year_index` for one trajectory
pub fn advance_year<S: ShockSource>(
    plan: &RunPlan<'_>,
    state: &mut TrajectoryState,
    shocks: &mut S,
    year_index: usize,
    simulation_index: usize,
) -> Result<(), SimulationError> {
    let ctx = plan.year(year_index);

    // One shock vector per year, depleted or not
    let z = shocks.next_shocks();

    if state.depleted {
        state
            .records
            .push(YearRecord::depleted(ctx.year, ctx.age, ctx.weights));
        return Ok(());
    }

    let portfolio_return = plan.schedule.portfolio_return(year_index, &z);
    let start = state.balance;

    let decision = plan.spending.decide(&SpendingInput {
        year: ctx.year,
        start_balance: start,
        prior: state.prior,
    });

    let expenses = decision.target + ctx.stream_expenses;
    let income = ctx.other_income + ctx.social_security;
    let net_need = (expenses - income).max(0.0);
    let other_taxable = ctx.other_income + ctx.taxable_social_security;

    let tax_config = &plan.config.tax;
    let gross_up = match solve_gross_withdrawal(net_need, other_taxable, tax_config) {
        Ok(g) => g,
        Err(source) => match tax_config.solver.on_non_convergence {
            SolverFallback::UpperBound => {
                let TaxError::NonConvergence { last_gross, .. } = source;
                warn!(
                    simulation_index,
                    year = ctx.year,
                    net_need,
                    last_gross,
                    "Tax solver did not converge, using upper bound"
                );
                state.solver_fallbacks += 1;
                GrossUp::at(last_gross, other_taxable, tax_config)
            }
            SolverFallback::Fail => {
                return Err(SimulationError::TaxSolver {
                    simulation_index,
                    year: ctx.year,
                    source,
                });
            }
        },
    };

    let gross = gross_up.gross;
    let withdrawn = gross.min(start);
    let shortfall = gross - withdrawn;
    let invested = start - withdrawn + ctx.windfall;
    let mut growth = invested * portfolio_return;
    let mut end = invested + growth;
    if end <= 0.0 {
        growth = -invested;
        end = 0.0;
        state.depleted = true;
    }

    state.records.push(YearRecord {
        year: ctx.year,
        age: ctx.age,
        weights: ctx.weights,
        portfolio_return,
        start_balance: start,
        spending_target: decision.target,
        guardrail_action: decision.action,
        clamp: decision.clamp,
        stream_expenses: ctx.stream_expenses,
        other_income: ctx.other_income,
        social_security: ctx.social_security,
        net_need,
        gross_withdrawal: gross,
        withdrawn,
        shortfall,
        tax: gross_up.tax,
        windfall: ctx.windfall,
        growth,
        end_balance: end,
        withdrawal_rate: if start > 0.0 { gross / start } else { 0.0 },
        depleted: state.depleted,
    });

    state.balance = end;
    state.prior = Some(PriorYear {
        base: decision.base,
        gross_withdrawal: gross,
    });
    Ok(())
}

/// Run one full trajectory through every simulated year
pub fn run_trajectory<S: ShockSource>(
    plan: &RunPlan<'_>,
    shocks: &mut S,
    simulation_index: usize,
) -> Result<TrajectoryState, SimulationError> {
    let mut state = TrajectoryState::new(plan.config.start_capital, plan.horizon());
    for t in 0..plan.horizon() {
        advance_year(plan, &mut state, shocks, t, simulation_index)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CashFlowStream, SocialSecurityConfig, SpendingPolicy};
    use crate::returns::ExpectedReturns;

    #[test]
    fn test_surplus_is_not_reinvested() {
        let config = SimulationConfig {
            horizon_years: 3,
            start_capital: 1_000_000.0,
            spending: SpendingPolicy::FixedAnnual {
                annual_spending: 10_000.0,
            },
            income_streams: vec![CashFlowStream::new(2025, 3, 50_000.0)],
            ..Default::default()
        };
        let plan = RunPlan::new(&config).unwrap();
        let state = run_trajectory(&plan, &mut ExpectedReturns, 0).unwrap();
        for r in &state.records {
            assert_eq!(r.net_need, 0.0);
            assert_eq!(r.gross_withdrawal, 0.0);
            assert_eq!(r.tax, 0.0);
            assert_eq!(r.end_balance, r.start_balance + r.growth);
        }
    }

    #[test]
    fn test_year_context_uses_retirement_age() {
        let config = SimulationConfig {
            retirement_age: 60,
            horizon_years: 10,
            social_security: Some(SocialSecurityConfig {
                start_age: 62,
                ..Default::default()
            }),
            ..Default::default()
        };
        let plan = RunPlan::new(&config).unwrap();
        assert_eq!(plan.year(0).age, 60);
        assert_eq!(plan.year(1).social_security, 0.0);
        assert!(plan.year(2).social_security > 0.0);
        assert!(
            (plan.year(2).taxable_social_security - 0.85 * plan.year(2).social_security).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_windfall_deposited_before_growth() {
        let config = SimulationConfig {
            horizon_years: 2,
            start_capital: 100_000.0,
            spending: SpendingPolicy::FixedAnnual {
                annual_spending: 0.0,
            },
            windfalls: vec![crate::model::Windfall {
                year: 2026,
                amount: 50_000.0,
            }],
            ..Default::default()
        };
        let plan = RunPlan::new(&config).unwrap();
        let state = run_trajectory(&plan, &mut ExpectedReturns, 0).unwrap();
        let y1 = &state.records[1];
        assert_eq!(y1.windfall, 50_000.0);
        assert_eq!(y1.growth, (y1.start_balance + 50_000.0) * y1.portfolio_return);
    }
}
